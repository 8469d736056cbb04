//! Chess rules engine
//!
//! Board representation, per-piece move generation, check / checkmate /
//! stalemate detection and move legality enforcement for one game. The crate
//! is pure and synchronous; the server wraps one [`RulesEngine`] per game
//! behind its own lock.

pub mod board;
pub mod constants;
pub mod error;
pub mod move_gen;
pub mod rules;
pub mod types;

pub use board::Board;
pub use error::{ChessEngineError, ChessEngineResult};
pub use move_gen::pseudo_moves;
pub use rules::{GameStatus, RulesEngine};
pub use types::{Color, Move, Piece, PieceKind, Position};
