//! Knight move generation
//!
//! A knight steps to one of the eight `KNIGHT_OFFSETS` squares, ignoring
//! anything in between. Off-board and friendly-occupied targets are dropped.

use super::push_step_moves;
use crate::board::Board;
use crate::constants::KNIGHT_OFFSETS;
use crate::types::*;

/// Generate knight moves from a given square
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = Vec::new();
/// generate_knight_moves(&board, "b1".parse()?, Color::White, &mut moves);
/// // a3 and c3 from the starting position
/// ```
pub fn generate_knight_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    push_step_moves(board, from, color, &KNIGHT_OFFSETS, moves);
}
