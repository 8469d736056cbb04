//! Board representation
//!
//! An 8×8 grid of optional pieces. The board is plain data: it knows nothing
//! about turns or legality. Mutation (`place` / `remove`) is crate-private so
//! that only the rules engine changes a live game's board; callers outside
//! the crate can build boards (standard layout, diagram, piece list) and
//! read them, never edit them in place.
//!
//! # Diagram format
//!
//! Boards print and parse as eight lines, rank 8 first, one `|`-separated
//! cell per file. Uppercase letters are White, lowercase Black, a space is
//! an empty square:
//!
//! ```text
//! |r|n|b|q|k|b|n|r|
//! |p|p|p|p|p|p|p|p|
//! | | | | | | | | |
//! | | | | | | | | |
//! | | | | | | | | |
//! | | | | | | | | |
//! |P|P|P|P|P|P|P|P|
//! |R|N|B|Q|K|B|N|R|
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::BACK_RANK;
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::*;

/// Piece placement, indexed `[row - 1][col - 1]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl Board {
    /// A board with no pieces
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting layout
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            for (i, kind) in BACK_RANK.iter().enumerate() {
                board.squares[color.back_rank() as usize - 1][i] = Some(Piece::new(color, *kind));
            }
            board.squares[color.pawn_rank() as usize - 1] =
                [Some(Piece::new(color, PieceKind::Pawn)); 8];
        }
        board
    }

    /// Build a board from an explicit piece list; later entries win on a shared square
    pub fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = (Position, Piece)>,
    {
        let mut board = Board::empty();
        for (pos, piece) in pieces {
            board.place(pos, piece);
        }
        board
    }

    /// Parse the eight-line diagram format described in the module docs
    pub fn from_diagram(diagram: &str) -> ChessEngineResult<Self> {
        let lines: Vec<&str> = diagram
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != 8 {
            return Err(ChessEngineError::InvalidDiagram {
                message: format!("expected 8 ranks, found {}", lines.len()),
            });
        }

        let mut board = Board::empty();
        for (i, line) in lines.iter().enumerate() {
            let row = 8 - i;
            let cells: Vec<&str> = line.trim_matches('|').split('|').collect();
            if cells.len() != 8 {
                return Err(ChessEngineError::InvalidDiagram {
                    message: format!("rank {} has {} files", row, cells.len()),
                });
            }
            for (col, cell) in cells.iter().enumerate() {
                let mut chars = cell.chars();
                let symbol = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    (None, None) => ' ',
                    _ => {
                        return Err(ChessEngineError::InvalidDiagram {
                            message: format!("bad cell {:?} on rank {}", cell, row),
                        })
                    }
                };
                if symbol == ' ' {
                    continue;
                }
                let piece =
                    Piece::from_symbol(symbol).ok_or_else(|| ChessEngineError::InvalidDiagram {
                        message: format!("unknown piece {:?} on rank {}", symbol, row),
                    })?;
                board.squares[row - 1][col] = Some(piece);
            }
        }
        Ok(board)
    }

    /// Piece at a square, if any
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row() as usize - 1][pos.col() as usize - 1]
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.piece_at(pos).is_none()
    }

    /// Color of the piece at a square, `None` if empty
    #[inline]
    pub fn color_at(&self, pos: Position) -> Option<Color> {
        self.piece_at(pos).map(|p| p.color)
    }

    /// Put a piece on a square, replacing whatever was there
    #[inline]
    pub(crate) fn place(&mut self, pos: Position, piece: Piece) {
        self.squares[pos.row() as usize - 1][pos.col() as usize - 1] = Some(piece);
    }

    /// Clear a square, returning its previous occupant
    #[inline]
    pub(crate) fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.squares[pos.row() as usize - 1][pos.col() as usize - 1].take()
    }

    /// Every occupied square, row 1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.piece_at(pos).map(|p| (pos, p)))
    }

    /// Occupied squares of one side
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// Square of `color`'s king; `None` on boards without one
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=8u8).rev() {
            write!(f, "|")?;
            for col in 1..=8u8 {
                let symbol = Position::new(row, col)
                    .and_then(|pos| self.piece_at(pos))
                    .map_or(' ', Piece::symbol);
                write!(f, "{}|", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
