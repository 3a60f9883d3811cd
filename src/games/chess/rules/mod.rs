//! Game rules for chess termination.
//!
//! Checkmate and stalemate need full legal-move knowledge and are asked of
//! the oracle; the draw rules are pure functions of the game state.

pub mod draw;
pub mod terminal;

pub use draw::{fifty_move_rule, insufficient_material, threefold_repetition};
pub use terminal::{detect, detect_draw};
