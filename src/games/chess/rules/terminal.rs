//! Terminal-state detection.

use super::draw::{fifty_move_rule, insufficient_material, threefold_repetition};
use crate::games::chess::{GameResult, GameState};
use crate::oracle::{Oracle, OracleError};
use tracing::{debug, instrument};

/// Classifies a state, checking in fixed priority order:
/// checkmate, stalemate, repetition, fifty-move rule, insufficient material.
///
/// Only the first two consult the oracle.
#[instrument(skip_all, fields(move_number = state.move_number(), side = %state.side_to_move()))]
pub fn detect(state: &GameState, oracle: &dyn Oracle) -> Result<GameResult, OracleError> {
    let result = if oracle.is_checkmate(state)? {
        GameResult::Checkmate {
            winner: state.side_to_move().opponent(),
        }
    } else if oracle.is_stalemate(state)? {
        GameResult::Stalemate
    } else {
        detect_draw(state)
    };

    debug!(?result, "Terminal check complete");
    Ok(result)
}

/// The three oracle-free draw rules, in priority order.
#[instrument(skip_all)]
pub fn detect_draw(state: &GameState) -> GameResult {
    if threefold_repetition(state) {
        GameResult::Repetition
    } else if fifty_move_rule(state) {
        GameResult::FiftyMove
    } else if insufficient_material(state.board()) {
        GameResult::InsufficientMaterial
    } else {
        GameResult::InProgress
    }
}
