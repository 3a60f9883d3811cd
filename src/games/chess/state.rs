//! The canonical game state and its repetition ledger.

use super::position::{File, Square};
use super::types::{Board, Color, PieceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Canonical serialization of a position, used to count repetitions.
///
/// Holds the piece placement, side to move, castling rights and the
/// en-passant target (only when a capture is actually available), so equal
/// keys always describe positions with the same legal continuations.
pub type PositionKey = String;

/// Complete game state.
///
/// States are never edited after creation; each applied move produces a
/// fresh state via [`GameState::successor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Half-moves played so far.
    move_number: u32,
    /// How many times each position has been reached.
    position_counts: BTreeMap<PositionKey, u32>,
    /// Half-moves since the last pawn move or capture.
    halfmove_clock: u32,
    /// Side to move.
    side_to_move: Color,
    /// The board.
    board: Board,
}

impl GameState {
    /// Standard starting position, White to move, start position counted once.
    #[instrument]
    pub fn initial() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    /// A fresh game from an arbitrary board, its position counted once.
    #[instrument(skip(board))]
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        let mut state = Self {
            move_number: 0,
            position_counts: BTreeMap::new(),
            halfmove_clock: 0,
            side_to_move,
            board,
        };
        state.position_counts.insert(state.position_key(), 1);
        state
    }

    /// Assembles a state from explicit parts.
    ///
    /// `halfmove_clock` is clamped to `move_number`.
    pub fn from_parts(
        board: Board,
        side_to_move: Color,
        move_number: u32,
        halfmove_clock: u32,
        position_counts: BTreeMap<PositionKey, u32>,
    ) -> Self {
        Self {
            move_number,
            position_counts,
            halfmove_clock: halfmove_clock.min(move_number),
            side_to_move,
            board,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Half-moves played so far.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Half-moves since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Move number of the most recent pawn move or capture (0 if none yet).
    pub fn last_capture_or_pawn_move(&self) -> u32 {
        self.move_number - self.halfmove_clock
    }

    /// Repetition ledger.
    pub fn position_counts(&self) -> &BTreeMap<PositionKey, u32> {
        &self.position_counts
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> u32 {
        self.position_counts
            .get(&self.position_key())
            .copied()
            .unwrap_or(0)
    }

    /// State reached by playing a move that produced `board`.
    ///
    /// Advances the move number, flips the side to move, resets or advances
    /// the half-move clock and records the new position in the ledger.
    /// Per-piece `move_count`/`last_move_index` are the caller's business.
    #[instrument(skip(self, board), fields(move_number = self.move_number))]
    pub fn successor(&self, board: Board, pawn_move_or_capture: bool) -> Self {
        let mut next = Self {
            move_number: self.move_number + 1,
            position_counts: self.position_counts.clone(),
            halfmove_clock: if pawn_move_or_capture {
                0
            } else {
                self.halfmove_clock + 1
            },
            side_to_move: self.side_to_move.opponent(),
            board,
        };
        *next.position_counts.entry(next.position_key()).or_insert(0) += 1;
        next
    }

    /// Canonical key of this position.
    pub fn position_key(&self) -> PositionKey {
        let ep = self
            .en_passant_target()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {}",
            self.board.placement(),
            self.side_char(),
            self.castling_rights(),
            ep
        )
    }

    /// FEN for this state.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {}",
            self.position_key(),
            self.halfmove_clock,
            self.move_number / 2 + 1
        )
    }

    fn side_char(&self) -> char {
        match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// FEN castling field derived from unmoved kings and rooks.
    pub fn castling_rights(&self) -> String {
        let mut rights = String::new();
        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            let unmoved = |file: File, kind: PieceType| {
                self.board
                    .get(Square::new(file, rank))
                    .is_some_and(|p| p.color == color && p.kind == kind && p.is_unmoved())
            };
            if !unmoved(File::E, PieceType::King) {
                continue;
            }
            for (file, letter) in [(File::H, 'k'), (File::A, 'q')] {
                if unmoved(file, PieceType::Rook) {
                    rights.push(match color {
                        Color::White => letter.to_ascii_uppercase(),
                        Color::Black => letter,
                    });
                }
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// Square a pawn could capture onto en passant, if any.
    ///
    /// Requires an enemy pawn that double-stepped on the previous move and a
    /// pawn of the side to move standing beside it.
    pub fn en_passant_target(&self) -> Option<Square> {
        let us = self.side_to_move;
        self.board.pieces().find_map(|(sq, piece)| {
            let double_stepped = piece.color == us.opponent()
                && piece.kind == PieceType::Pawn
                && piece.move_count == 1
                && piece.last_move_index == self.move_number
                && self.move_number > 0
                && sq.rank().index() as isize == us.opponent().pawn_rank().index() as isize
                    + 2 * us.opponent().forward();
            if !double_stepped {
                return None;
            }
            let coord = sq.to_coordinate();
            let has_capturer = [-1, 1].into_iter().any(|d_row| {
                coord
                    .offset(d_row, 0)
                    .and_then(|c| self.board.at(c))
                    .is_some_and(|p| p.color == us && p.kind == PieceType::Pawn)
            });
            if has_capturer {
                coord.offset(0, -us.opponent().forward()).map(|c| c.to_square())
            } else {
                None
            }
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
