//! Session error types.

use crate::oracle::OracleError;
use derive_more::{Display, Error};

/// Error raised by a session operation.
///
/// Rejected input (clicking an empty square, an illegal destination) is not
/// an error; those interactions are reported as no-ops instead.
#[derive(Debug, Clone, Display, Error)]
pub enum SessionError {
    /// The oracle broke its contract, e.g. an impossible move count for one
    /// source/destination pair or a computer move outside the legal set.
    #[display("Oracle protocol violation: {}", _0)]
    ProtocolViolation(#[error(not(source))] String),

    /// The operation needs a started session.
    #[display("Session has not been started")]
    NotStarted,

    /// `start_session` was called on a session that is already running.
    #[display("Session already started")]
    AlreadyStarted,

    /// The session coordinator is no longer running.
    #[display("Session coordinator has stopped")]
    Closed,

    /// The oracle failed to answer.
    #[display("{}", _0)]
    Oracle(OracleError),
}

impl SessionError {
    /// Creates a protocol violation error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation(message.into())
    }
}

impl From<OracleError> for SessionError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}
