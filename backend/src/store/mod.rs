//! Game persistence
//!
//! The coordinator keeps the authoritative in-memory aggregate for every game
//! it has touched and writes through to a [`GameStore`] after each accepted
//! change. Two backends are provided:
//!
//! - [`MemoryGameStore`] - process-local map, used by tests and `--storage memory`
//! - [`SqliteGameStore`] - `sqlx` SQLite table with the engine state as JSON

mod memory;
mod sqlite;

pub use memory::MemoryGameStore;
pub use sqlite::SqliteGameStore;

use async_trait::async_trait;
use chess_engine::RulesEngine;
use serde::{Deserialize, Serialize};
use shared::{GameId, GameSummary};

use crate::error::StoreResult;

/// Persisted form of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub game_name: String,
    pub white: Option<String>,
    pub black: Option<String>,
    pub engine: RulesEngine,
}

impl GameRecord {
    pub fn new(game_id: GameId, game_name: &str) -> Self {
        GameRecord {
            game_id,
            game_name: game_name.to_string(),
            white: None,
            black: None,
            engine: RulesEngine::new(),
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id,
            game_name: self.game_name.clone(),
            white_username: self.white.clone(),
            black_username: self.black.clone(),
        }
    }
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Create a fresh game in the starting position; ids start at 1
    async fn create(&self, game_name: &str) -> StoreResult<GameRecord>;

    async fn fetch(&self, game_id: GameId) -> StoreResult<Option<GameRecord>>;

    /// Lobby listing, ordered by id
    async fn list(&self) -> StoreResult<Vec<GameSummary>>;

    /// Overwrite a stored game. Fails with `NotFound` for an unknown id.
    async fn replace(&self, record: &GameRecord) -> StoreResult<()>;

    /// Overwrite only while the stored status is still in progress.
    ///
    /// Returns `false` (and writes nothing) when the stored game has already
    /// ended, so a late writer cannot resurrect a finished game.
    async fn replace_if_in_progress(&self, record: &GameRecord) -> StoreResult<bool>;

    /// Administrative wipe of every game
    async fn clear(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chess_engine::Color;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn sqlite_store() -> SqliteGameStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        SqliteGameStore::new(pool).await.expect("Schema should apply")
    }

    async fn exercise_store(store: &dyn GameStore) {
        let first = store.create("first").await.unwrap();
        let second = store.create("second").await.unwrap();
        assert_eq!(first.game_id, 1);
        assert_eq!(second.game_id, 2);

        let mut record = store.fetch(first.game_id).await.unwrap().expect("stored");
        assert_eq!(record, first);
        assert!(store.fetch(99).await.unwrap().is_none());

        record.white = Some("alice".to_string());
        record.engine.apply_move("e2-e4".parse().unwrap()).unwrap();
        assert!(store.replace_if_in_progress(&record).await.unwrap());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].white_username.as_deref(), Some("alice"));
        assert_eq!(listed[1].game_name, "second");

        let stored = store.fetch(first.game_id).await.unwrap().unwrap();
        assert_eq!(stored.engine.side_to_move(), Color::Black);

        // Once the stored game is over, conditional writes are refused
        record.engine.resign(Color::Black).unwrap();
        assert!(store.replace_if_in_progress(&record).await.unwrap());
        let mut late = stored.clone();
        late.black = Some("mallory".to_string());
        assert!(!store.replace_if_in_progress(&late).await.unwrap());
        let after = store.fetch(first.game_id).await.unwrap().unwrap();
        assert!(after.engine.status().is_terminal());
        assert_eq!(after.black, None);

        // Unconditional replace still works for seat bookkeeping
        late.engine = after.engine.clone();
        store.replace(&late).await.unwrap();
        assert_eq!(
            store.fetch(first.game_id).await.unwrap().unwrap().black.as_deref(),
            Some("mallory")
        );

        let ghost = GameRecord::new(77, "ghost");
        assert!(matches!(
            store.replace(&ghost).await,
            Err(StoreError::NotFound(77))
        ));

        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        exercise_store(&MemoryGameStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_store_contract() {
        exercise_store(&sqlite_store().await).await;
    }
}
