//! Core domain types for chess: colors, pieces and the 8×8 board.

use super::position::{Coordinate, File, Rank, Square};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Side in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// White (moves first).
    White,
    /// Black.
    Black,
}

impl Color {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank this side's pieces start on.
    pub fn back_rank(self) -> Rank {
        match self {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        }
    }

    /// Rank this side's pawns start on.
    pub fn pawn_rank(self) -> Rank {
        match self {
            Color::White => Rank::Second,
            Color::Black => Rank::Seventh,
        }
    }

    /// Rank a pawn of this side promotes on.
    pub fn promotion_rank(self) -> Rank {
        self.opponent().back_rank()
    }

    /// Direction pawns of this side advance in, as a rank delta.
    pub fn forward(self) -> isize {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Kind of chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    /// Pawn.
    Pawn,
    /// Rook.
    Rook,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceType {
    /// The four kinds a pawn may promote to.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Lowercase letter used in coordinate notation (`p n b r q k`).
    pub fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Rook => 'r',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// Parses a piece letter, either case.
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Self::iter().find(|kind| kind.to_char() == c)
    }

    /// Whether a pawn may promote to this kind.
    pub fn is_promotable(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }
}

/// A piece on the board.
///
/// Empty squares are `None` in the [`Board`], so every `Piece` is an active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Owner.
    pub color: Color,
    /// Kind.
    pub kind: PieceType,
    /// How many times this piece has moved.
    pub move_count: u32,
    /// Move number of this piece's most recent move, 0 if it never moved.
    pub last_move_index: u32,
}

impl Piece {
    /// Creates an unmoved piece.
    pub fn new(color: Color, kind: PieceType) -> Self {
        Self {
            color,
            kind,
            move_count: 0,
            last_move_index: 0,
        }
    }

    /// Whether this piece has never moved.
    pub fn is_unmoved(&self) -> bool {
        self.move_count == 0
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.to_char().to_ascii_uppercase(),
            Color::Black => self.kind.to_char(),
        }
    }
}

/// 8×8 chess board indexed by [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// `squares[row][col]`, see [`Coordinate`].
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Creates an empty board.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Creates a board in the standard starting layout.
    pub fn standard() -> Self {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut board = Self::empty();
        for color in Color::iter() {
            for (file, kind) in File::iter().zip(BACK_RANK) {
                board.set(Square::new(file, color.back_rank()), Some(Piece::new(color, kind)));
                board.set(
                    Square::new(file, color.pawn_rank()),
                    Some(Piece::new(color, PieceType::Pawn)),
                );
            }
        }
        board
    }

    /// Piece on the given square.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.at(square.to_coordinate())
    }

    /// Piece at the given coordinate.
    pub fn at(&self, coord: Coordinate) -> Option<Piece> {
        self.squares[coord.row()][coord.col()]
    }

    /// Places (or clears, with `None`) a square.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        let coord = square.to_coordinate();
        self.squares[coord.row()][coord.col()] = piece;
    }

    /// Removes and returns the piece on a square.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let coord = square.to_coordinate();
        self.squares[coord.row()][coord.col()].take()
    }

    /// Whether a square is empty.
    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
    }

    /// Square of the given side's king, if present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.kind == PieceType::King)
            .map(|(sq, _)| sq)
    }

    /// FEN piece-placement field (rank 8 first).
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in Rank::iter().rev() {
            let mut gap = 0;
            for file in File::iter() {
                match self.get(Square::new(file, rank)) {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(piece.symbol());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if rank != Rank::First {
                out.push('/');
            }
        }
        out
    }

    /// Formats the board as a human-readable diagram, rank 8 at the top.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for rank in Rank::iter().rev() {
            result.push(rank.to_char());
            result.push(' ');
            for file in File::iter() {
                let symbol = self.get(Square::new(file, rank)).map_or('.', |p| p.symbol());
                result.push(symbol);
                if file != File::H {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h");
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.pieces().count(), 32);
        for color in Color::iter() {
            assert_eq!(board.pieces().filter(|(_, p)| p.color == color).count(), 16);
        }
        let e1 = board.get("e1".parse().unwrap()).unwrap();
        assert_eq!((e1.color, e1.kind), (Color::White, PieceType::King));
        let d8 = board.get("d8".parse().unwrap()).unwrap();
        assert_eq!((d8.color, d8.kind), (Color::Black, PieceType::Queen));
        assert!(board.is_empty("e4".parse().unwrap()));
    }

    #[test]
    fn test_standard_placement() {
        assert_eq!(
            Board::standard().placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(Board::empty().placement(), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_display_top_row_is_rank_eight() {
        let display = Board::standard().display();
        assert!(display.starts_with("8 r n b q k b n r"));
        assert!(display.ends_with("  a b c d e f g h"));
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(PieceType::from_char('Q'), Some(PieceType::Queen));
        assert_eq!(PieceType::from_char('n'), Some(PieceType::Knight));
        assert_eq!(PieceType::from_char('x'), None);
        assert!(!PieceType::King.is_promotable());
        assert!(PieceType::Knight.is_promotable());
    }
}
