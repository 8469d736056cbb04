//! Rules engine state and legality queries

use serde::{Deserialize, Serialize};

use super::GameStatus;
use crate::board::Board;
use crate::move_gen::{self, pseudo_moves};
use crate::types::*;

/// One game's authoritative rules state: board, side to move, status
///
/// While the status is `InProgress` exactly one side may move. Every
/// accepted move flips the side to move and re-derives the status before
/// returning to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesEngine {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) status: GameStatus,
    #[serde(default)]
    pub(crate) move_count: u32,
}

impl Default for RulesEngine {
    fn default() -> Self {
        RulesEngine::new()
    }
}

impl RulesEngine {
    /// Standard starting position, White to move
    pub fn new() -> Self {
        RulesEngine {
            board: Board::standard(),
            side_to_move: Color::White,
            status: GameStatus::InProgress,
            move_count: 0,
        }
    }

    /// Start from an arbitrary position
    ///
    /// The status is derived immediately, so a position that is already
    /// mate or stalemate for `side_to_move` starts terminal.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        let mut engine = RulesEngine {
            board,
            side_to_move,
            status: GameStatus::InProgress,
            move_count: 0,
        };
        engine.status = engine.derive_status();
        engine
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Number of moves applied since the engine was created
    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Legal moves of the piece on `from`
    ///
    /// Empty when the square is empty, when the piece does not belong to the
    /// side to move, or when the game is over.
    pub fn legal_moves(&self, from: Position) -> Vec<Move> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        match self.board.piece_at(from) {
            Some(piece) if piece.color == self.side_to_move => self.legal_moves_ignoring_turn(from),
            _ => Vec::new(),
        }
    }

    /// Every legal move `color` would have if it were its turn
    pub fn all_legal_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces_of(color)
            .flat_map(|(from, _)| self.legal_moves_ignoring_turn(from))
            .collect()
    }

    /// Whether `color`'s king is attacked by any enemy pseudo-move
    pub fn is_in_check(&self, color: Color) -> bool {
        move_gen::is_in_check(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub(crate) fn has_any_legal_move(&self, color: Color) -> bool {
        self.board.pieces_of(color).any(|(from, _)| {
            pseudo_moves(&self.board, from)
                .into_iter()
                .any(|mv| !self.leaves_king_in_check(mv, color))
        })
    }

    /// Pseudo-moves of the piece on `from` minus those exposing its own king
    fn legal_moves_ignoring_turn(&self, from: Position) -> Vec<Move> {
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        pseudo_moves(&self.board, from)
            .into_iter()
            .filter(|mv| !self.leaves_king_in_check(*mv, piece.color))
            .collect()
    }

    /// Play `mv` on a scratch copy and test `color`'s king
    fn leaves_king_in_check(&self, mv: Move, color: Color) -> bool {
        let mut scratch = self.board.clone();
        super::moves::execute(&mut scratch, mv);
        move_gen::is_in_check(&scratch, color)
    }
}
