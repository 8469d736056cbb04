//! Pawn move generation
//!
//! Handles pawn-specific move generation including:
//! - Single and double forward pushes
//! - Diagonal captures
//! - Promotion (one move per promotion kind)
//!
//! ## Pawn Movement Rules
//!
//! - **Forward push**: one square towards the opponent, only onto an empty square
//! - **Double push**: from the pawn's own starting rank (row 2 for White,
//!   row 7 for Black), two squares if both are empty
//! - **Captures**: one square diagonally forward, only onto an enemy piece
//! - **Promotion**: any move ending on the opponent's back rank is emitted
//!   once per kind in queen, rook, bishop, knight order
//!
//! En passant is not generated.

use crate::board::Board;
use crate::constants::PROMOTION_KINDS;
use crate::types::*;

/// Generate pawn moves from a given square
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = Vec::new();
/// generate_pawn_moves(&Board::standard(), "e2".parse()?, Color::White, &mut moves);
/// // e2-e3 and e2-e4
/// ```
pub fn generate_pawn_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let dir = color.forward();

    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            push_pawn_move(from, one, color, moves);

            if from.row() == color.pawn_rank() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.is_empty(two) {
                        push_pawn_move(from, two, color, moves);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        let Some(to) = from.offset(dir, d_col) else {
            continue;
        };
        if board.color_at(to) == Some(color.opponent()) {
            push_pawn_move(from, to, color, moves);
        }
    }
}

/// Emit a pawn move, expanding it into promotions on the far back rank
fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut Vec<Move>) {
    if to.row() == color.opponent().back_rank() {
        moves.extend(
            PROMOTION_KINDS
                .iter()
                .map(|kind| Move::with_promotion(from, to, *kind)),
        );
    } else {
        moves.push(Move::new(from, to));
    }
}
