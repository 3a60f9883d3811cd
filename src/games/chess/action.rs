//! Moves and the oracle-produced outcomes they lead to.

use super::position::Square;
use super::state::GameState;
use super::types::PieceType;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// A move: a piece travelling from `source` to `destination`.
///
/// Castling is written as the king's two-square step (`e1g1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Square the piece leaves.
    pub source: Square,
    /// Square the piece lands on.
    pub destination: Square,
    /// Promotion choice, only for pawns reaching the last rank.
    pub promotion: Option<PieceType>,
}

impl Move {
    /// Creates a non-promotion move.
    #[instrument]
    pub fn new(source: Square, destination: Square) -> Self {
        Self {
            source,
            destination,
            promotion: None,
        }
    }

    /// Creates a promotion move.
    #[instrument]
    pub fn promoting(source: Square, destination: Square, kind: PieceType) -> Self {
        Self {
            source,
            destination,
            promotion: Some(kind),
        }
    }

    /// Whether this move goes from `source` to `destination`, whatever the promotion.
    pub fn connects(&self, source: Square, destination: Square) -> bool {
        self.source == source && self.destination == destination
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.source, self.destination)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

/// Error parsing coordinate notation such as `e2e4` or `e7e8q`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Invalid move notation: {:?}", input)]
pub struct ParseMoveError {
    /// Text that failed to parse.
    pub input: String,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoveError {
            input: s.to_string(),
        };
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(err());
        }
        let source: Square = s[0..2].parse().map_err(|_| err())?;
        let destination: Square = s[2..4].parse().map_err(|_| err())?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(
                PieceType::from_char(c)
                    .filter(|k| k.is_promotable())
                    .ok_or_else(err)?,
            ),
        };
        Ok(Self {
            source,
            destination,
            promotion,
        })
    }
}

/// A legal move paired with the state it produces, as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The move.
    pub mv: Move,
    /// State after the move.
    pub resulting_state: GameState,
}

impl MoveOutcome {
    /// Pairs a move with its resulting state.
    pub fn new(mv: Move, resulting_state: GameState) -> Self {
        Self { mv, resulting_state }
    }
}
