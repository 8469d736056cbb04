//! Error types for chess engine
//!
//! Provides custom error types for rules engine operations including
//! move validation, game state transitions, and coordinate parsing.

use thiserror::Error;

use crate::types::Move;

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// Move is not in the legal move set, or the game has ended
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// The game already reached a terminal status
    #[error("Game is already over")]
    GameAlreadyOver,

    /// Coordinates outside 1..=8
    #[error("Invalid square: row {row}, column {col} (must be 1-8)")]
    InvalidSquare { row: i64, col: i64 },

    /// Unparseable coordinate or move notation
    #[error("Invalid notation: {text:?}")]
    InvalidNotation { text: String },

    /// Unparseable board diagram
    #[error("Invalid board diagram: {message}")]
    InvalidDiagram { message: String },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
