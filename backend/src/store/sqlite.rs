use async_trait::async_trait;
use chess_engine::{GameStatus, RulesEngine};
use shared::{GameId, GameSummary};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use tracing::info;

use super::{GameRecord, GameStore};
use crate::error::{StoreError, StoreResult};

/// Games table in SQLite. The engine state is a JSON column; `status` is
/// denormalised next to it so the conditional update can compare in SQL.
pub struct SqliteGameStore {
    db: Pool<Sqlite>,
}

impl SqliteGameStore {
    /// Wrap a pool and make sure the schema exists
    pub async fn new(db: Pool<Sqlite>) -> StoreResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS games (
                game_id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_name TEXT NOT NULL,
                white_username TEXT,
                black_username TEXT,
                status TEXT NOT NULL,
                engine TEXT NOT NULL
            );",
        )
        .execute(&db)
        .await?;
        info!("[STORE] SQLite games table ready");
        Ok(SqliteGameStore { db })
    }

    fn decode(row: &SqliteRow) -> StoreResult<GameRecord> {
        let engine: String = row.try_get("engine")?;
        Ok(GameRecord {
            game_id: row.try_get("game_id")?,
            game_name: row.try_get("game_name")?,
            white: row.try_get("white_username")?,
            black: row.try_get("black_username")?,
            engine: serde_json::from_str::<RulesEngine>(&engine)?,
        })
    }

    async fn exists(&self, game_id: GameId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM games WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl GameStore for SqliteGameStore {
    async fn create(&self, game_name: &str) -> StoreResult<GameRecord> {
        let engine = RulesEngine::new();
        let row = sqlx::query(
            "INSERT INTO games (game_name, status, engine) VALUES ($1, $2, $3) RETURNING game_id",
        )
        .bind(game_name)
        .bind(engine.status().code())
        .bind(serde_json::to_string(&engine)?)
        .fetch_one(&self.db)
        .await?;

        Ok(GameRecord::new(row.try_get("game_id")?, game_name))
    }

    async fn fetch(&self, game_id: GameId) -> StoreResult<Option<GameRecord>> {
        let row = sqlx::query(
            "SELECT game_id, game_name, white_username, black_username, engine
             FROM games WHERE game_id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<GameSummary>> {
        let rows = sqlx::query(
            "SELECT game_id, game_name, white_username, black_username
             FROM games ORDER BY game_id",
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<GameSummary> {
                Ok(GameSummary {
                    game_id: row.try_get("game_id")?,
                    game_name: row.try_get("game_name")?,
                    white_username: row.try_get("white_username")?,
                    black_username: row.try_get("black_username")?,
                })
            })
            .collect()
    }

    async fn replace(&self, record: &GameRecord) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE games
             SET game_name = $1, white_username = $2, black_username = $3, status = $4, engine = $5
             WHERE game_id = $6",
        )
        .bind(&record.game_name)
        .bind(&record.white)
        .bind(&record.black)
        .bind(record.engine.status().code())
        .bind(serde_json::to_string(&record.engine)?)
        .bind(record.game_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.game_id));
        }
        Ok(())
    }

    async fn replace_if_in_progress(&self, record: &GameRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE games
             SET game_name = $1, white_username = $2, black_username = $3, status = $4, engine = $5
             WHERE game_id = $6 AND status = $7",
        )
        .bind(&record.game_name)
        .bind(&record.white)
        .bind(&record.black)
        .bind(record.engine.status().code())
        .bind(serde_json::to_string(&record.engine)?)
        .bind(record.game_id)
        .bind(GameStatus::InProgress.code())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        if self.exists(record.game_id).await? {
            Ok(false)
        } else {
            Err(StoreError::NotFound(record.game_id))
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM games").execute(&self.db).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'games'")
            .execute(&self.db)
            .await?;
        info!("[STORE] Cleared all games");
        Ok(())
    }
}
