//! # Chess Engine Constants - Direction Tables & Starting Layout
//!
//! ## Direction Vectors for Move Generation
//!
//! Movement is encoded as signed `(row, col)` offsets applied to a
//! [`Position`](crate::types::Position):
//! - **North**: `(1, 0)` (towards Black's back rank)
//! - **South**: `(-1, 0)`
//! - **East**: `(0, 1)` (towards the h-file)
//! - **West**: `(0, -1)`
//! - **Diagonals**: combinations of the above
//!
//! Sliding pieces walk a ray by repeatedly adding the same offset until the
//! step leaves the board or meets a piece. Knights and kings apply each
//! offset exactly once. Because offsets are applied in two dimensions there
//! is no file wrap-around to guard against, unlike a 0-63 index encoding.
//!
//! ### Knight Moves: The "L-Shape" Pattern
//!
//! Knights jump rather than slide. Their 8 offsets are every combination of
//! one step on one axis and two on the other.

use crate::types::{PieceKind, PieceKind::*};

/// Orthogonal rays (rook, queen)
pub const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal rays (bishop, queen)
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight rays (queen)
pub const QUEEN_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

/// Unit steps in every direction (king)
pub const KING_OFFSETS: [(i8, i8); 8] = QUEEN_DIRS;

/// Pieces a pawn may become on the far back rank, in emission order
pub const PROMOTION_KINDS: [PieceKind; 4] = [Queen, Rook, Bishop, Knight];

/// Back rank layout from the a-file to the h-file
pub const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
