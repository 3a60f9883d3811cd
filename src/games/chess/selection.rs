//! Move selection: turning square interactions into one unambiguous move.
//!
//! The protocol is a small state machine. A first interaction picks up one
//! of the human's pieces, a second one names the destination. The oracle's
//! legal-move list then decides what happens: nothing matches (rejected),
//! exactly one move matches (played), or four promotion variants match (the
//! human has to pick a piece).
//!
//! [`Selection`] transitions are pure: each call returns the next selection
//! together with a [`SelectionStep`] describing what the session must do.

use super::{Color, GameState, Move, MoveOutcome, PieceType, Square};
use crate::error::SessionError;
use crate::oracle::Oracle;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// State of the selection protocol.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Idle,
    /// One of the human's pieces is picked up.
    SquareSelected(Square),
    /// A pawn reached the last rank; one candidate per promotion piece.
    PromotionPending(Vec<MoveOutcome>),
}

/// What a transition asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStep {
    /// The interaction had no effect.
    Ignored,
    /// A piece was picked up.
    Selected(Square),
    /// The picked-up piece was put back.
    Deselected,
    /// The destination is not legal; selection dropped.
    Rejected,
    /// Play this outcome.
    Apply(MoveOutcome),
    /// Waiting for a promotion choice.
    AwaitPromotion,
    /// A pending promotion was abandoned.
    PromotionCancelled,
}

impl Selection {
    /// Square currently picked up, if any.
    pub fn selected_square(&self) -> Option<Square> {
        match self {
            Selection::SquareSelected(square) => Some(*square),
            _ => None,
        }
    }

    /// Whether a promotion choice is outstanding.
    pub fn is_promotion_pending(&self) -> bool {
        matches!(self, Selection::PromotionPending(_))
    }

    /// Handles a click, drag start or drop on `square`.
    ///
    /// Must only be called while it is `human`'s turn in a running game.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ProtocolViolation`] when the oracle reports a
    /// number of matching moves other than 0, 1 or 4 (or four moves that are
    /// not one per promotion piece), and [`SessionError::Oracle`] when the
    /// oracle cannot answer.
    #[instrument(skip(self, state, oracle), fields(selection = ?self.selected_square()))]
    pub fn on_square(
        &self,
        square: Square,
        state: &GameState,
        human: Color,
        oracle: &dyn Oracle,
    ) -> Result<(Selection, SelectionStep), SessionError> {
        match self {
            Selection::Idle => {
                let own_piece = state
                    .board()
                    .get(square)
                    .is_some_and(|piece| piece.color == human);
                if own_piece {
                    debug!(%square, "Piece selected");
                    Ok((Selection::SquareSelected(square), SelectionStep::Selected(square)))
                } else {
                    Ok((Selection::Idle, SelectionStep::Ignored))
                }
            }
            Selection::SquareSelected(source) if *source == square => {
                debug!(%square, "Piece deselected");
                Ok((Selection::Idle, SelectionStep::Deselected))
            }
            Selection::SquareSelected(source) => {
                Self::choose_destination(*source, square, state, oracle)
            }
            Selection::PromotionPending(_) => {
                debug!("Promotion abandoned by square interaction");
                Ok((Selection::Idle, SelectionStep::PromotionCancelled))
            }
        }
    }

    /// Picks the promotion piece for a pending promotion.
    ///
    /// A piece type that is not among the candidates is ignored and the
    /// promotion stays pending.
    #[instrument(skip(self))]
    pub fn on_promotion(&self, kind: PieceType) -> (Selection, SelectionStep) {
        let Selection::PromotionPending(candidates) = self else {
            return (self.clone(), SelectionStep::Ignored);
        };
        match candidates.iter().find(|c| c.mv.promotion == Some(kind)) {
            Some(chosen) => (Selection::Idle, SelectionStep::Apply(chosen.clone())),
            None => {
                debug!(?kind, "Not a promotion candidate");
                (self.clone(), SelectionStep::Ignored)
            }
        }
    }

    /// Abandons a pending promotion without playing anything.
    #[instrument(skip(self))]
    pub fn on_cancel(&self) -> (Selection, SelectionStep) {
        match self {
            Selection::PromotionPending(_) => (Selection::Idle, SelectionStep::PromotionCancelled),
            Selection::SquareSelected(_) => (Selection::Idle, SelectionStep::Deselected),
            Selection::Idle => (Selection::Idle, SelectionStep::Ignored),
        }
    }

    fn choose_destination(
        source: Square,
        destination: Square,
        state: &GameState,
        oracle: &dyn Oracle,
    ) -> Result<(Selection, SelectionStep), SessionError> {
        let mut matches: Vec<MoveOutcome> = oracle
            .possible_moves(state)?
            .into_iter()
            .filter(|outcome| outcome.mv.connects(source, destination))
            .collect();

        match matches.len() {
            0 => {
                debug!(%source, %destination, "Illegal destination rejected");
                Ok((Selection::Idle, SelectionStep::Rejected))
            }
            1 => {
                let outcome = matches.remove(0);
                debug!(mv = %outcome.mv, "Move chosen");
                Ok((Selection::Idle, SelectionStep::Apply(outcome)))
            }
            4 if covers_promotions(&matches) => {
                debug!(%source, %destination, "Promotion pending");
                Ok((Selection::PromotionPending(matches), SelectionStep::AwaitPromotion))
            }
            count => {
                warn!(%source, %destination, count, "Inconsistent move set from oracle");
                Err(SessionError::protocol(format!(
                    "{count} moves match {source}{destination}; expected 0, 1 or 4 promotions"
                )))
            }
        }
    }
}

/// Four candidates, one per promotion piece.
fn covers_promotions(candidates: &[MoveOutcome]) -> bool {
    PieceType::PROMOTIONS.iter().all(|kind| {
        candidates
            .iter()
            .filter(|c| c.mv.promotion == Some(*kind))
            .count()
            == 1
    })
}

/// Moves offered by a pending promotion, for display.
pub fn candidate_moves(selection: &Selection) -> Vec<Move> {
    match selection {
        Selection::PromotionPending(candidates) => candidates.iter().map(|c| c.mv).collect(),
        _ => Vec::new(),
    }
}
