use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use backend::api::{self, AppState};
use backend::config::{ServerConfig, StorageKind};
use backend::store::{GameStore, MemoryGameStore, SqliteGameStore};
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    if config.uses_dev_secret() {
        warn!("[BACKEND] JWT_SECRET not set; using the development secret");
    }

    // Database Connection
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("invalid database URL {}", config.database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to connect to database")?;

    let store: Arc<dyn GameStore> = match config.storage {
        StorageKind::Memory => Arc::new(MemoryGameStore::new()),
        StorageKind::Sqlite => Arc::new(SqliteGameStore::new(pool.clone()).await?),
    };
    info!("[BACKEND] Game storage: {:?}", config.storage);

    let state = AppState::new(pool, store, &config.jwt_secret, config.token_ttl_hours)
        .await
        .context("failed to initialise account schema")?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("[BACKEND] Listening on {}", config.bind);

    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
