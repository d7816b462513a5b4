//! Session error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// The ways a session operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionErrorKind {
    /// The player is already bound to a live match.
    #[display("Player {} is already in match {}", _0, _1)]
    AlreadyInMatch(String, String),

    /// No match with this name exists.
    #[display("Match {} not found", _0)]
    MatchNotFound(String),

    /// The match already has both sides bound.
    #[display("Match {} is full", _0)]
    MatchFull(String),

    /// The connection occupies neither side of the match.
    #[display("Connection {} is not a participant of match {}", _0, _1)]
    NotAParticipant(String, String),

    /// Every generated match name was already taken.
    #[display("No unused match name after {} attempts", _0)]
    NameExhausted(usize),

    /// The inbound message could not be decoded.
    #[display("Malformed message: {}", _0)]
    MalformedMessage(String),

    /// No player is registered under this connection id.
    #[display("Unknown connection {}", _0)]
    UnknownConnection(String),
}

/// Session error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", kind, file, line)]
pub struct SessionError {
    /// What went wrong.
    pub kind: SessionErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SessionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &SessionErrorKind {
        &self.kind
    }
}

impl From<SessionErrorKind> for SessionError {
    #[track_caller]
    fn from(kind: SessionErrorKind) -> Self {
        Self::new(kind)
    }
}
