//! Draw rules computed from the game state alone.
//!
//! Repetition, the fifty-move rule and insufficient material need no
//! legal-move knowledge, so they never consult the oracle.

use super::super::position::SquareShade;
use super::super::{Board, GameState, PieceType};
use super::super::types::Color;
use tracing::instrument;

/// Threefold repetition: some position has been reached three times.
#[instrument(skip(state), fields(move_number = state.move_number()))]
pub fn threefold_repetition(state: &GameState) -> bool {
    state.position_counts().values().copied().max().unwrap_or(0) >= 3
}

/// Fifty-move rule: 100 half-moves without a pawn move or capture.
#[instrument(skip(state), fields(move_number = state.move_number()))]
pub fn fifty_move_rule(state: &GameState) -> bool {
    state.move_number() - state.last_capture_or_pawn_move() >= 100
}

/// Material class used by the insufficient-material rule.
///
/// Bishops are split by the shade of the square they stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Material {
    Piece(PieceType),
    Bishop(SquareShade),
}

impl Material {
    fn is_minor(self) -> bool {
        matches!(self, Material::Piece(PieceType::Knight) | Material::Bishop(_))
    }
}

/// Insufficient material, in its simplified form.
///
/// With kings removed, the smaller material set `min` and the larger `max`:
/// - both empty: draw
/// - `min` empty, `max` a single knight or bishop: draw
/// - both a single bishop of the same shade: draw
/// - anything else: not a draw
///
/// Some theoretically drawn endings (e.g. several same-shade bishops) are
/// not detected.
#[instrument(skip(board))]
pub fn insufficient_material(board: &Board) -> bool {
    let material = |color: Color| -> Vec<Material> {
        board
            .pieces()
            .filter(|(_, p)| p.color == color && p.kind != PieceType::King)
            .map(|(sq, p)| match p.kind {
                PieceType::Bishop => Material::Bishop(sq.shade()),
                kind => Material::Piece(kind),
            })
            .collect()
    };

    let white = material(Color::White);
    let black = material(Color::Black);
    let (min, max) = if white.len() < black.len() {
        (white, black)
    } else {
        (black, white)
    };

    match (min.as_slice(), max.as_slice()) {
        ([], []) => true,
        ([], [only]) => only.is_minor(),
        ([Material::Bishop(a)], [Material::Bishop(b)]) => a == b,
        _ => false,
    }
}
