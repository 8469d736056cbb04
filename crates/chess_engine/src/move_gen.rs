//! Pseudo-legal move generation
//!
//! Produces every move a piece's movement pattern allows on the current
//! board, honouring occupancy (no landing on friendly pieces, sliding pieces
//! stop at the first occupied square) but ignoring whose turn it is and
//! whether the mover's own king would be left in check. Legality filtering
//! lives in [`crate::rules`].
//!
//! Per-kind behaviour is dispatched through a plain function table keyed by
//! [`PieceKind`]; each generator appends into a shared output vector.
//!
//! ## Module Organization
//!
//! - `sliding` - Rooks, bishops and queens (ray walking)
//! - `knight` - Fixed L-shaped jumps
//! - `king` - Single steps (no castling)
//! - `pawn` - Pushes, double pushes, diagonal captures, promotions
//! - `attack` - Square attack and check detection built on the generators

use crate::board::Board;
use crate::types::*;

pub mod attack;
pub mod king;
pub mod knight;
pub mod pawn;
pub mod sliding;

pub use attack::{is_in_check, is_square_attacked};

/// Signature shared by every per-kind generator
pub type Generator = fn(&Board, Position, Color, &mut Vec<Move>);

/// Generator for a piece kind
#[inline]
pub fn generator_for(kind: PieceKind) -> Generator {
    match kind {
        PieceKind::Pawn => pawn::generate_pawn_moves,
        PieceKind::Knight => knight::generate_knight_moves,
        PieceKind::Bishop => sliding::generate_bishop_moves,
        PieceKind::Rook => sliding::generate_rook_moves,
        PieceKind::Queen => sliding::generate_queen_moves,
        PieceKind::King => king::generate_king_moves,
    }
}

/// Pseudo-legal moves of the piece standing on `from`
///
/// Returns an empty vector when the square is empty. Off-board targets are
/// never produced.
pub fn pseudo_moves(board: &Board, from: Position) -> Vec<Move> {
    let mut moves = Vec::new();
    if let Some(piece) = board.piece_at(from) {
        generator_for(piece.kind)(board, from, piece.color, &mut moves);
    }
    moves
}

/// Pseudo-legal moves of every piece of one side
pub fn generate_pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces_of(color) {
        generator_for(piece.kind)(board, from, color, &mut moves);
    }
    moves
}

/// Apply single-step offsets (knight, king): empty or enemy-occupied targets are kept
pub(crate) fn push_step_moves(
    board: &Board,
    from: Position,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(d_row, d_col) in offsets {
        let Some(to) = from.offset(d_row, d_col) else {
            continue;
        };
        if board.color_at(to) != Some(color) {
            moves.push(Move::new(from, to));
        }
    }
}
