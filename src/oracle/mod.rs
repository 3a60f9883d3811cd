//! The move-generation oracle boundary.
//!
//! The session layer never generates or validates moves itself. Everything
//! it needs to know about legality is asked through [`Oracle`], which any
//! move generator can implement. [`ShakmatyOracle`] is the adapter shipped
//! with the crate.

mod shakmaty_oracle;

pub use shakmaty_oracle::ShakmatyOracle;

use crate::games::chess::{GameState, MoveOutcome};
use derive_more::{Display, Error};
use tracing::instrument;

/// Legality and search queries answered by an external move generator.
///
/// Implementations own no session state. Calls may be slow (search), so the
/// turn coordinator runs [`Oracle::computer_move`] off the session's task.
pub trait Oracle: Send + Sync {
    /// Every legal move from `state`, each paired with its resulting state.
    ///
    /// Empty exactly when the side to move has no legal move.
    fn possible_moves(&self, state: &GameState) -> Result<Vec<MoveOutcome>, OracleError>;

    /// One legal move chosen by the oracle's own policy.
    ///
    /// Must be a member of [`Oracle::possible_moves`] for the same state.
    fn computer_move(&self, state: &GameState) -> Result<MoveOutcome, OracleError>;

    /// The side to move has no legal move and is in check.
    fn is_checkmate(&self, state: &GameState) -> Result<bool, OracleError>;

    /// The side to move has no legal move and is not in check.
    fn is_stalemate(&self, state: &GameState) -> Result<bool, OracleError>;
}

/// Error reported by an oracle, with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
