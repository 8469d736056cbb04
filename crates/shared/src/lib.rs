//! Types exchanged between the chess server and its clients.

pub mod protocol;

pub use protocol::{ClientCommand, GameId, GameSnapshot, GameSummary, ServerMessage};
