//! Move execution and validation

use super::{GameStatus, RulesEngine};
use crate::board::Board;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::*;

impl RulesEngine {
    /// Validate and play a move for the side to move
    ///
    /// Rejected with [`ChessEngineError::IllegalMove`] when the game is over,
    /// when `mv.from` is empty, or when `mv` is not one of
    /// [`legal_moves`](RulesEngine::legal_moves) for that square (which also
    /// covers moving the opponent's pieces). On success the side to move
    /// flips and the new status is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_engine::{Color, GameStatus, Move, RulesEngine};
    ///
    /// let mut engine = RulesEngine::new();
    /// let status = engine.apply_move("e2-e4".parse::<Move>().unwrap()).unwrap();
    /// assert_eq!(status, GameStatus::InProgress);
    /// assert_eq!(engine.side_to_move(), Color::Black);
    /// ```
    pub fn apply_move(&mut self, mv: Move) -> ChessEngineResult<GameStatus> {
        if self.status.is_terminal() || self.board.is_empty(mv.from) {
            return Err(ChessEngineError::IllegalMove { mv });
        }
        if !self.legal_moves(mv.from).contains(&mv) {
            return Err(ChessEngineError::IllegalMove { mv });
        }

        execute(&mut self.board, mv);
        self.side_to_move = self.side_to_move.opponent();
        self.move_count += 1;
        self.status = self.derive_status();
        Ok(self.status)
    }
}

/// Move the piece on `mv.from` to `mv.to`, capturing and promoting as needed
///
/// Does no validation; an empty source square leaves the board unchanged.
pub(crate) fn execute(board: &mut Board, mv: Move) {
    let Some(piece) = board.remove(mv.from) else {
        return;
    };
    let landed = match mv.promotion {
        Some(kind) => Piece::new(piece.color, kind),
        None => piece,
    };
    board.place(mv.to, landed);
}
