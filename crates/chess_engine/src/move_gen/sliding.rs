//! Sliding piece move generation
//!
//! Common functionality for sliding pieces (bishops, rooks, queens).
//! These pieces can move multiple squares in a direction until blocked.
//!
//! ## Algorithm
//!
//! For every ray direction of the piece:
//! 1. Step one square along the ray
//! 2. Stop at the board edge
//! 3. Empty square: emit the move and keep walking
//! 4. Opponent piece: emit the capture, then stop
//! 5. Own piece: stop without emitting

use crate::board::Board;
use crate::constants::{BISHOP_DIRS, QUEEN_DIRS, ROOK_DIRS};
use crate::types::*;

/// Walk each ray in `dirs` from `from`, appending reachable squares
pub fn generate_sliding_moves(
    board: &Board,
    from: Position,
    color: Color,
    dirs: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(d_row, d_col) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_col) {
            match board.color_at(to) {
                None => moves.push(Move::new(from, to)),
                Some(other) => {
                    if other != color {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

pub fn generate_rook_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_sliding_moves(board, from, color, &ROOK_DIRS, moves);
}

pub fn generate_bishop_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_sliding_moves(board, from, color, &BISHOP_DIRS, moves);
}

/// Queen moves are the union of rook and bishop rays
pub fn generate_queen_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_sliding_moves(board, from, color, &QUEEN_DIRS, moves);
}
