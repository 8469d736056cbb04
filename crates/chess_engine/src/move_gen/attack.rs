//! Attack detection and square checking
//!
//! Provides functions to check if squares are under attack and if kings are
//! in check. This module is critical for move legality validation and check
//! detection.
//!
//! ## Algorithm
//!
//! A square is attacked by a side when any pseudo-legal move of any of that
//! side's pieces lands on it. Pawn pushes can only land on empty squares, so
//! for an occupied target (a king) this reduces to the usual diagonal pawn
//! attack.

use super::generator_for;
use crate::board::Board;
use crate::types::*;

/// Check if a square is reachable by any piece of `by_color`
///
/// # Examples
///
/// ```rust,ignore
/// // Is White's king on e1 attacked by Black?
/// let attacked = is_square_attacked(&board, "e1".parse()?, Color::Black);
/// ```
pub fn is_square_attacked(board: &Board, square: Position, by_color: Color) -> bool {
    let mut moves = Vec::with_capacity(32);
    for (from, piece) in board.pieces_of(by_color) {
        moves.clear();
        generator_for(piece.kind)(board, from, by_color, &mut moves);
        if moves.iter().any(|mv| mv.to == square) {
            return true;
        }
    }
    false
}

/// Whether `color`'s king is attacked
///
/// A board without a king of that color is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_position(color)
        .is_some_and(|king| is_square_attacked(board, king, color.opponent()))
}
