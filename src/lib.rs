//! Chess Session - a human-versus-computer chess session layer
//!
//! The crate keeps one authoritative game state, turns square interactions
//! into unambiguous moves, detects finished games and schedules the
//! computer's replies. Move generation is delegated to an [`Oracle`].
//!
//! # Architecture
//!
//! - **Games**: position model, game state, draw rules, move selection
//! - **Oracle**: legality boundary, with a `shakmaty` adapter
//! - **Session**: the state owner and its turn bookkeeping
//! - **Coordinator**: tokio actor that runs the session and the oracle
//! - **Console**: stdin/stdout front end
//!
//! # Example
//!
//! ```no_run
//! use chess_session::{Color, GameSession, ShakmatyOracle, Square, File, Rank};
//!
//! # fn example() -> Result<(), chess_session::SessionError> {
//! let oracle = ShakmatyOracle::seeded(7);
//! let mut session = GameSession::new();
//! session.start_session(Color::White)?;
//! session.run_pending_turns(&oracle)?;
//!
//! session.handle_square_interaction(Square::new(File::E, Rank::Second), &oracle)?;
//! session.handle_square_interaction(Square::new(File::E, Rank::Fourth), &oracle)?;
//! session.run_pending_turns(&oracle)?;
//! assert_eq!(session.move_log().len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod console;
mod coordinator;
mod error;
mod games;
mod oracle;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_LOG_FILTER, SessionConfig};

// Crate-level exports - Console front end
pub use console::{ConsoleCommand, HELP, ParseCommandError, render_event, render_snapshot, run_console};

// Crate-level exports - Turn coordination
pub use coordinator::{GameEvent, SessionCommand, SessionHandle, TurnCoordinator};

// Crate-level exports - Errors
pub use error::SessionError;

// Crate-level exports - Oracle boundary
pub use oracle::{Oracle, OracleError, ShakmatyOracle};

// Crate-level exports - Session
pub use session::{
    AcceptOutcome, GameSession, HumanSide, InteractionOutcome, SessionSnapshot, SessionStatus,
    TurnAction, TurnTicket,
};

// Crate-level exports - Chess types
pub use games::chess::rules;
pub use games::chess::{
    Board, Color, Coordinate, File, GameResult, GameState, Move, MoveOutcome, ParseMoveError,
    ParseSquareError, Piece, PieceType, PositionKey, Rank, Selection, SelectionStep, Square,
    SquareShade,
};
