use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Where games are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Memory,
    Sqlite,
}

/// Server configuration; every flag can also come from the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Multiplayer chess server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CHESS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// SQLite database for accounts (and games with `--storage sqlite`)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:chess.db")]
    pub database_url: String,

    #[arg(long, env = "CHESS_STORAGE", value_enum, default_value_t = StorageKind::Sqlite)]
    pub storage: StorageKind,

    /// HMAC secret for auth tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET)]
    pub jwt_secret: String,

    #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = 168)]
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
