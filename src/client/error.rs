//! Contains the [`FtpError`] type returned by every client operation.

use derive_more::Display;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The Result type used by the client.
pub type Result<T> = std::result::Result<T, FtpError>;

/// The error type of the FTP client.
#[derive(Debug, Error)]
pub enum FtpError {
    /// The DSN or another setting is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The control connection could not be established.
    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        /// `host:port` we tried to reach
        endpoint: String,
        /// The socket level failure
        #[source]
        source: std::io::Error,
    },
    /// The server rejected our credentials. The password itself is never kept.
    #[error("authentication failed for {user} (using password: {}): {source}", if *with_password { "yes" } else { "no" })]
    Authentication {
        /// The user name sent with `USER`
        user: String,
        /// Whether a password was supplied
        with_password: bool,
        /// The protocol failure that ended the login
        #[source]
        source: Box<FtpError>,
    },
    /// The server answered with a status code we did not expect.
    #[error("Unexpected response [{code}:{message}], expecting {}", Expected(expected))]
    UnexpectedReply {
        /// The status code received
        code: u32,
        /// The text following the status code
        message: String,
        /// The codes that would have been acceptable
        expected: Vec<u32>,
    },
    /// The server violated the protocol in a way not tied to a status code.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A transport failure during a listing or transfer.
    #[error("{context}: {source}")]
    Io {
        /// What we were doing
        context: String,
        /// The underlying failure
        #[source]
        source: BoxError,
    },
    /// The server closed the control connection.
    #[error("Connection closed by remote host")]
    ConnectionClosed,
    /// An operation needed a connected control channel.
    #[error("Not connected")]
    NotConnected,
    /// The requested entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// An operation was used in the wrong state, e.g. a file where a directory was expected.
    #[error("illegal state: {0}")]
    IllegalState(String),
    /// A listing line did not match the grammar of the active parser.
    #[error("cannot parse \"{line}\": {reason}")]
    Format {
        /// The raw listing line
        line: String,
        /// What did not match
        reason: String,
    },
    /// A transfer ended in the aborted state.
    #[error("Transfer from {source_name} to {target} (mode {mode}) was aborted")]
    TransferAborted {
        /// Where the bytes came from
        source_name: String,
        /// Where the bytes were going
        target: String,
        /// The transfer mode
        mode: String,
    },
}

/// Categories of [`FtpError`], mirroring the kinds of failures callers usually branch on.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// Bad DSN, scheme or option
    #[display("Configuration error")]
    Configuration,
    /// Socket level connect failure
    #[display("Connect error")]
    Connect,
    /// Login failed
    #[display("Authentication error")]
    Authentication,
    /// Unexpected reply or other protocol violation
    #[display("Protocol error")]
    Protocol,
    /// Transport failure
    #[display("I/O error")]
    Io,
    /// Entry absent
    #[display("Not found")]
    NotFound,
    /// Misuse or type mismatch
    #[display("Illegal state")]
    IllegalState,
    /// Unparseable listing line
    #[display("Format error")]
    Format,
    /// Transfer aborted by the caller
    #[display("Transfer aborted")]
    TransferAborted,
}

impl FtpError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FtpError::Configuration(_) => ErrorKind::Configuration,
            FtpError::Connect { .. } => ErrorKind::Connect,
            FtpError::Authentication { .. } => ErrorKind::Authentication,
            FtpError::UnexpectedReply { .. } | FtpError::Protocol(_) => ErrorKind::Protocol,
            FtpError::Io { .. } | FtpError::ConnectionClosed | FtpError::NotConnected => ErrorKind::Io,
            FtpError::NotFound(_) => ErrorKind::NotFound,
            FtpError::IllegalState(_) => ErrorKind::IllegalState,
            FtpError::Format { .. } => ErrorKind::Format,
            FtpError::TransferAborted { .. } => ErrorKind::TransferAborted,
        }
    }

    /// The status code of an unexpected reply, if that is what this error is about.
    pub fn reply_code(&self) -> Option<u32> {
        match self {
            FtpError::UnexpectedReply { code, .. } => Some(*code),
            FtpError::Authentication { source, .. } => source.reply_code(),
            _ => None,
        }
    }

    pub(crate) fn io<E>(context: impl Into<String>, source: E) -> FtpError
    where
        E: Into<BoxError>,
    {
        FtpError::Io {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn format(line: &str, reason: impl Into<String>) -> FtpError {
        FtpError::Format {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for FtpError {
    fn from(err: std::io::Error) -> Self {
        FtpError::io("I/O error", err)
    }
}

// Renders the set of acceptable codes the way the server logs read best.
struct Expected<'a>(&'a [u32]);

impl fmt::Display for Expected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [single] => write!(f, "{single}"),
            codes => {
                let list: Vec<String> = codes.iter().map(u32::to_string).collect();
                write!(f, "one of ({})", list.join(", "))
            }
        }
    }
}
