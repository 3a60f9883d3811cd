//! Squares, files, ranks and their zero-based board coordinates.
//!
//! A [`Square`] is the algebraic name of a cell (`e4`); a [`Coordinate`] is
//! the `(row, col)` index pair used to address the board container. The
//! mapping between them is total in both directions: every square has a
//! coordinate and every in-range coordinate has a square.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::instrument;

/// A board file, `a` through `h`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum File {
    /// File a
    A,
    /// File b
    B,
    /// File c
    C,
    /// File d
    D,
    /// File e
    E,
    /// File f
    F,
    /// File g
    G,
    /// File h
    H,
}

impl File {
    /// Zero-based index (a = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// File for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Lowercase letter for this file.
    pub fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }

    /// Parses a lowercase or uppercase file letter.
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            Self::from_index((c as u8 - b'a') as usize)
        } else {
            None
        }
    }
}

/// A board rank, `1` through `8`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Rank {
    /// Rank 1
    First,
    /// Rank 2
    Second,
    /// Rank 3
    Third,
    /// Rank 4
    Fourth,
    /// Rank 5
    Fifth,
    /// Rank 6
    Sixth,
    /// Rank 7
    Seventh,
    /// Rank 8
    Eighth,
}

impl Rank {
    /// Zero-based index (rank 1 = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rank for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Digit for this rank.
    pub fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }

    /// Parses a rank digit.
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10)
            .filter(|d| (1..=8).contains(d))
            .and_then(|d| Self::from_index(d as usize - 1))
    }
}

/// Light/dark classification of a square.
///
/// Used to tell same-shade bishops apart in the insufficient-material rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquareShade {
    /// `(row + col)` is odd.
    Light,
    /// `(row + col)` is even; a1 is dark.
    Dark,
}

/// Zero-based `(row, col)` projection of a [`Square`].
///
/// `row` is the file index and `col` the rank index, so `a1` is `(0, 0)` and
/// `h8` is `(7, 7)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    row: usize,
    col: usize,
}

impl Coordinate {
    /// Creates a coordinate, or `None` if either component is outside `0..8`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self { row, col })
    }

    /// Row component (file index).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column component (rank index).
    pub fn col(self) -> usize {
        self.col
    }

    /// Square named by this coordinate.
    pub fn to_square(self) -> Square {
        // Components are range-checked at construction.
        let file = File::from_index(self.row).unwrap_or(File::H);
        let rank = Rank::from_index(self.col).unwrap_or(Rank::Eighth);
        Square::new(file, rank)
    }

    /// Shade of the square at this coordinate.
    pub fn shade(self) -> SquareShade {
        if (self.row + self.col) % 2 == 0 {
            SquareShade::Dark
        } else {
            SquareShade::Light
        }
    }

    /// Coordinate displaced by `(d_row, d_col)`, if it stays on the board.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row as isize + d_row;
        let col = self.col as isize + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Self::new(row as usize, col as usize)
        } else {
            None
        }
    }
}

/// A named board square such as `e4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Square {
    file: File,
    rank: Rank,
}

impl Square {
    /// Creates a square from its file and rank.
    pub const fn new(file: File, rank: Rank) -> Self {
        Self { file, rank }
    }

    /// The square's file.
    pub fn file(self) -> File {
        self.file
    }

    /// The square's rank.
    pub fn rank(self) -> Rank {
        self.rank
    }

    /// Board coordinate of this square.
    pub fn to_coordinate(self) -> Coordinate {
        Coordinate {
            row: self.file.index(),
            col: self.rank.index(),
        }
    }

    /// Shade of this square.
    pub fn shade(self) -> SquareShade {
        self.to_coordinate().shade()
    }

    /// All 64 squares, a1, a2, … h8.
    pub fn all() -> impl Iterator<Item = Square> {
        File::iter().flat_map(|file| Rank::iter().map(move |rank| Square::new(file, rank)))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_char())
    }
}

/// Error parsing a square name.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Invalid square: {:?}", input)]
pub struct ParseSquareError {
    /// Text that failed to parse.
    pub input: String,
}

impl FromStr for Square {
    type Err = ParseSquareError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError {
            input: s.to_string(),
        };
        let mut chars = s.trim().chars();
        let file = chars.next().and_then(File::from_char).ok_or_else(err)?;
        let rank = chars.next().and_then(Rank::from_char).ok_or_else(err)?;
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Square::new(file, rank))
    }
}
