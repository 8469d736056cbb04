//! Game status and its transitions
//!
//! `InProgress` is the only non-terminal status. Every other status is a
//! sink: once entered, no move, resignation or abandonment changes it.
//!
//! ```text
//! InProgress → Checkmate(winner) / Stalemate / Resigned(winner) / Abandoned
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RulesEngine;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::Color;

/// Lifecycle status of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    InProgress,
    Checkmate {
        winner: Color,
    },
    Stalemate,
    Resigned {
        winner: Color,
    },
    Abandoned,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }

    /// Winning side, if the game ended decisively
    pub fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(winner),
            _ => None,
        }
    }

    /// Stable upper-case tag, also used as the storage column value
    pub fn code(self) -> &'static str {
        match self {
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::Checkmate { .. } => "CHECKMATE",
            GameStatus::Stalemate => "STALEMATE",
            GameStatus::Resigned { .. } => "RESIGNED",
            GameStatus::Abandoned => "ABANDONED",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "game in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => write!(f, "stalemate, the game is drawn"),
            GameStatus::Resigned { winner } => {
                write!(f, "{} resigned, {} wins", winner.opponent(), winner)
            }
            GameStatus::Abandoned => write!(f, "game abandoned"),
        }
    }
}

impl RulesEngine {
    /// Status the position implies for the side to move
    ///
    /// No legal moves and in check is checkmate for the other side; no legal
    /// moves and not in check is stalemate.
    pub(crate) fn derive_status(&self) -> GameStatus {
        let side = self.side_to_move;
        if self.has_any_legal_move(side) {
            GameStatus::InProgress
        } else if self.is_in_check(side) {
            GameStatus::Checkmate {
                winner: side.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// `color` concedes; the opponent wins
    pub fn resign(&mut self, color: Color) -> ChessEngineResult<GameStatus> {
        self.finish(GameStatus::Resigned {
            winner: color.opponent(),
        })
    }

    /// End the game with no result
    pub fn abandon(&mut self) -> ChessEngineResult<GameStatus> {
        self.finish(GameStatus::Abandoned)
    }

    fn finish(&mut self, status: GameStatus) -> ChessEngineResult<GameStatus> {
        if self.status.is_terminal() {
            return Err(ChessEngineError::GameAlreadyOver);
        }
        self.status = status;
        Ok(status)
    }
}
