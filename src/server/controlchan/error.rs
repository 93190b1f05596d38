//! Contains the `ControlChanError` struct that that defines the control channel error type.

use super::line_parser::error::ParseError;

use derive_more::Display;
use thiserror::Error;

/// The error type returned by the control channel.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

/// A list specifying categories of control channel errors. It is meant to be used with the
/// [ControlChanError] type.
#[derive(Eq, PartialEq, Debug, Display, Clone)]
pub enum ControlChanErrorKind {
    /// We encountered a system IO error.
    #[display("Failed to perform IO")]
    IoError,
    /// Something went wrong parsing the client's command.
    #[display("Failed to parse command")]
    ParseError,
    /// Authentication backend returned an error.
    #[display("Something went wrong when trying to authenticate")]
    AuthenticationError,
    /// We encountered a non-UTF8 character in the command.
    #[display("Non-UTF8 character in command")]
    Utf8Error,
    /// The client issued a command that we know about, but in an invalid way (e.g. `USER` without
    /// an username).
    #[display("Invalid command (invalid parameter)")]
    InvalidCommand,
    /// The timer on the Control Channel elapsed.
    #[display("Encountered read timeout on the control channel")]
    ControlChannelTimeout,
}

impl ControlChanError {
    /// Creates a new control channel error with the specific kind
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    /// Return the inner error kind of this error.
    pub fn kind(&self) -> &ControlChanErrorKind {
        &self.kind
    }

    fn with_source<E>(kind: ControlChanErrorKind, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ControlChanError {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError::new(kind)
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError::with_source(ControlChanErrorKind::IoError, err)
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError::with_source(ControlChanErrorKind::Utf8Error, err)
    }
}

impl From<ftpkit_core::auth::AuthenticationError> for ControlChanError {
    fn from(err: ftpkit_core::auth::AuthenticationError) -> ControlChanError {
        ControlChanError::with_source(ControlChanErrorKind::AuthenticationError, err)
    }
}

impl From<ParseError> for ControlChanError {
    fn from(err: ParseError) -> ControlChanError {
        let kind = match err {
            ParseError::InvalidUtf8 => ControlChanErrorKind::Utf8Error,
            ParseError::InvalidCommand => ControlChanErrorKind::InvalidCommand,
            ParseError::InvalidEol => ControlChanErrorKind::ParseError,
        };
        ControlChanError::with_source(kind, err)
    }
}
