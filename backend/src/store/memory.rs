use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::{GameId, GameSummary};

use super::{GameRecord, GameStore};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct MemoryInner {
    games: BTreeMap<GameId, GameRecord>,
    next_id: GameId,
}

/// In-process store; everything is lost on restart
#[derive(Default)]
pub struct MemoryGameStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn create(&self, game_name: &str) -> StoreResult<GameRecord> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let record = GameRecord::new(inner.next_id, game_name);
        inner.games.insert(record.game_id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, game_id: GameId) -> StoreResult<Option<GameRecord>> {
        Ok(self.inner.read().games.get(&game_id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<GameSummary>> {
        Ok(self
            .inner
            .read()
            .games
            .values()
            .map(GameRecord::summary)
            .collect())
    }

    async fn replace(&self, record: &GameRecord) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let slot = inner
            .games
            .get_mut(&record.game_id)
            .ok_or(StoreError::NotFound(record.game_id))?;
        *slot = record.clone();
        Ok(())
    }

    async fn replace_if_in_progress(&self, record: &GameRecord) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        let slot = inner
            .games
            .get_mut(&record.game_id)
            .ok_or(StoreError::NotFound(record.game_id))?;
        if slot.engine.status().is_terminal() {
            return Ok(false);
        }
        *slot = record.clone();
        Ok(true)
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.games.clear();
        inner.next_id = 0;
        Ok(())
    }
}
