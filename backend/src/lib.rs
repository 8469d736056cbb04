//! Multiplayer chess server
//!
//! HTTP lobby (accounts, game catalogue) plus a WebSocket session
//! coordinator that keeps every player and observer of a game in sync.

pub mod aggregate;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod game;
pub mod sessions;
pub mod store;
pub mod types;
pub mod ws;
