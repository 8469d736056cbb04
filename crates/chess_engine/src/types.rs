//! # Chess Engine Core Types
//!
//! ## Overview
//!
//! Value types shared by every layer of the server: colors, piece kinds,
//! board coordinates and moves. All of them are small `Copy` values with
//! structural equality, so they can be hashed, compared and sent over the
//! wire without carrying any identity or history.
//!
//! ## Coordinates
//!
//! A [`Position`] is a `(row, col)` pair, both 1-indexed in `1..=8`.
//! Row 1 is White's back rank and column 1 is the a-file, so `e2` is
//! `Position { row: 2, col: 5 }`. Construction always validates the range;
//! off-board coordinates only ever exist as signed offsets inside move
//! generation and never escape as a `Position`.
//!
//! ## Wire format
//!
//! Positions serialize as `{"row": 2, "col": 5}` and are range-checked on
//! deserialization (`#[serde(try_from = ...)]`), which is how out-of-range
//! squares in client commands become malformed-command errors instead of
//! panics deeper in the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChessEngineError, ChessEngineResult};

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// The other side
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a forward pawn step for this side
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row holding this side's pieces at the start of the game
    #[inline]
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    /// Row holding this side's pawns at the start of the game
    #[inline]
    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Kind of chess piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Letter used in diagrams and promotion suffixes (uppercase)
    pub fn letter(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

/// A colored piece. Location is the board's business, not the piece's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// Diagram symbol: uppercase for White, lowercase for Black
    pub fn symbol(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }
}

/// A square on the board, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    col: i64,
}

impl TryFrom<RawPosition> for Position {
    type Error = ChessEngineError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::try_new(raw.row, raw.col)
    }
}

impl Position {
    /// Build a position, returning `None` when off the board
    #[inline]
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// Build a position from untrusted integers
    pub fn try_new(row: i64, col: i64) -> ChessEngineResult<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Ok(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(ChessEngineError::InvalidSquare { row, col })
        }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Step by a signed `(row, col)` delta; `None` if that leaves the board
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Every square, row 1 first
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8u8).flat_map(|row| (1..=8u8).map(move |col| Position { row, col }))
    }

    /// File letter ('a'..='h')
    pub fn file_char(self) -> char {
        (b'a' + self.col - 1) as char
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.row)
    }
}

impl FromStr for Position {
    type Err = ChessEngineError;

    /// Parse coordinate notation such as `e2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChessEngineError::InvalidNotation {
            text: s.to_string(),
        };
        let mut chars = s.trim().chars();
        let file = chars.next().ok_or_else(invalid)?.to_ascii_lowercase();
        let rank = chars.next().ok_or_else(invalid)?;
        if chars.next().is_some() || !('a'..='h').contains(&file) {
            return Err(invalid());
        }
        let row = rank.to_digit(10).ok_or_else(invalid)? as u8;
        let col = file as u8 - b'a' + 1;
        Position::new(row, col).ok_or_else(invalid)
    }
}

/// A move request or a generated move.
///
/// `promotion` is only set when a pawn lands on the far back rank. Equality
/// is structural over all three fields, so `e7-e8=Q` and `e7-e8=N` are
/// different moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    #[serde(default)]
    pub promotion: Option<PieceKind>,
}

impl Move {
    #[inline]
    pub fn new(from: Position, to: Position) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub fn with_promotion(from: Position, to: Position, kind: PieceKind) -> Self {
        Move {
            from,
            to,
            promotion: Some(kind),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "={}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ChessEngineError;

    /// Parse `e2-e4`, `e2e4`, `e7-e8=Q` or `e7e8q`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChessEngineError::InvalidNotation {
            text: s.to_string(),
        };
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '=')
            .collect();
        if !cleaned.is_ascii() || !(4..=5).contains(&cleaned.len()) {
            return Err(invalid());
        }
        let from = cleaned[0..2].parse::<Position>().map_err(|_| invalid())?;
        let to = cleaned[2..4].parse::<Position>().map_err(|_| invalid())?;
        let promotion = match cleaned[4..].chars().next() {
            Some(c) => match PieceKind::from_letter(c) {
                Some(PieceKind::King) | Some(PieceKind::Pawn) | None => return Err(invalid()),
                kind => kind,
            },
            None => None,
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_notation() {
        let e2: Position = "e2".parse().unwrap();
        assert_eq!((e2.row(), e2.col()), (2, 5));
        assert_eq!(e2.to_string(), "e2");
        assert_eq!("H8".parse::<Position>().unwrap(), Position::new(8, 8).unwrap());

        for bad in ["", "e", "e9", "i1", "e22", "5e"] {
            assert!(bad.parse::<Position>().is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_position_range_checked() {
        assert!(Position::new(0, 1).is_none());
        assert!(Position::new(1, 9).is_none());
        assert_eq!(
            Position::try_new(-1, 3),
            Err(ChessEngineError::InvalidSquare { row: -1, col: 3 })
        );

        let a1 = Position::new(1, 1).unwrap();
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(a1.offset(1, 2), Position::new(2, 3));
        assert_eq!(Position::all().count(), 64);
    }

    #[test]
    fn test_position_json_rejects_off_board() {
        let ok: Position = serde_json::from_str(r#"{"row": 3, "col": 4}"#).unwrap();
        assert_eq!(ok.to_string(), "d3");
        assert!(serde_json::from_str::<Position>(r#"{"row": 9, "col": 4}"#).is_err());
        assert!(serde_json::from_str::<Position>(r#"{"row": 3}"#).is_err());
    }

    #[test]
    fn test_move_notation() {
        let plain: Move = "e2-e4".parse().unwrap();
        assert_eq!(plain, "e2e4".parse().unwrap());
        assert_eq!(plain.promotion, None);

        let promo: Move = "e7e8q".parse().unwrap();
        assert_eq!(promo.promotion, Some(PieceKind::Queen));
        assert_eq!(promo.to_string(), "e7-e8=Q");
        assert_ne!(promo, "e7-e8=N".parse::<Move>().unwrap());

        assert!("e7-e8=K".parse::<Move>().is_err());
        assert!("e2".parse::<Move>().is_err());
    }

    #[test]
    fn test_piece_symbols() {
        let black_knight = Piece::from_symbol('n').unwrap();
        assert_eq!(black_knight, Piece::new(Color::Black, PieceKind::Knight));
        assert_eq!(black_knight.symbol(), 'n');
        assert_eq!(Piece::new(Color::White, PieceKind::Queen).symbol(), 'Q');
        assert!(Piece::from_symbol('x').is_none());
        assert_eq!(Color::White.opponent(), Color::Black);
    }
}
