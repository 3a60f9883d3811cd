mod action;
mod outcome;
mod position;
pub mod rules;
pub mod selection;
mod state;
mod types;

pub use action::{Move, MoveOutcome, ParseMoveError};
pub use outcome::GameResult;
pub use position::{Coordinate, File, ParseSquareError, Rank, Square, SquareShade};
pub use selection::{Selection, SelectionStep};
pub use state::{GameState, PositionKey};
pub use types::{Board, Color, Piece, PieceType};
