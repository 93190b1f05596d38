use std::{result, str::Utf8Error};
use thiserror::Error;

/// Why a line from the client is not a command, returned by [parse](super::parse).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Empty line, or a verb that is not plain ASCII letters
    #[error("parse error: no valid command verb")]
    InvalidCommand,
    /// Non-UTF8 bytes in the verb or its argument
    #[error("parse error: non-UTF8 character")]
    InvalidUtf8,
    /// The line does not end in a newline
    #[error("parse error: invalid end-of-line")]
    InvalidEol,
}

impl From<Utf8Error> for ParseError {
    fn from(_: Utf8Error) -> ParseError {
        ParseError::InvalidUtf8
    }
}

pub type Result<T> = result::Result<T, ParseError>;
