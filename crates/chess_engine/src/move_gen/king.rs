//! King move generation
//!
//! Kings move one square in any direction (horizontally, vertically, or
//! diagonally). Squares attacked by the opponent are not excluded here; that
//! is the legality filter's job. Castling is not generated.

use super::push_step_moves;
use crate::board::Board;
use crate::constants::KING_OFFSETS;
use crate::types::*;

pub fn generate_king_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    push_step_moves(board, from, color, &KING_OFFSETS, moves);
}
