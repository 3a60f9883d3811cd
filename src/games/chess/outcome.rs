//! Terminal classification of a game state.

use super::types::Color;
use serde::{Deserialize, Serialize};

/// Result of evaluating a state for termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// The game goes on.
    InProgress,
    /// The side to move is checkmated.
    Checkmate {
        /// The side that delivered mate.
        winner: Color,
    },
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// A position occurred for the third time.
    Repetition,
    /// 100 half-moves without a pawn move or capture.
    FiftyMove,
    /// Neither side can force mate.
    InsufficientMaterial,
}

impl GameResult {
    /// Whether the game has ended.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Whether the game ended in a draw.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameResult::Stalemate
                | GameResult::Repetition
                | GameResult::FiftyMove
                | GameResult::InsufficientMaterial
        )
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameResult::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    /// Result line from the point of view of the human playing `human`.
    pub fn describe_for(&self, human: Color) -> String {
        match self {
            GameResult::Checkmate { winner } if *winner == human => {
                "You won by checkmate.".to_string()
            }
            GameResult::Checkmate { .. } => "Computer won by checkmate.".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::InProgress => write!(f, "Game in progress."),
            GameResult::Checkmate { winner } => write!(f, "{winner} won by checkmate."),
            GameResult::Stalemate => write!(f, "Draw by stalemate."),
            GameResult::Repetition => write!(f, "Draw by repetition."),
            GameResult::FiftyMove => write!(f, "Draw by 50-move rule."),
            GameResult::InsufficientMaterial => write!(f, "Draw by insufficient material."),
        }
    }
}
