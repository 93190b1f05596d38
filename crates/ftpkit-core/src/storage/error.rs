use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by storage back-ends. The `ErrorKind` chosen by an implementation
/// determines the reply the FTP client gets to see.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Detailed information about what the FTP server should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::PermanentFileNotAvailable,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => ErrorKind::FileNameNotAllowed,
            std::io::ErrorKind::DirectoryNotEmpty => ErrorKind::PermanentDirectoryNotEmpty,
            std::io::ErrorKind::StorageFull => ErrorKind::InsufficientStorageSpace,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}

/// The `ErrorKind` variants that can be produced by [`Storage`] implementations. The display
/// form starts with the FTP reply code sent to the client.
///
/// [`Storage`]: super::Storage
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// 450, something that may succeed when retried, e.g. a busy file.
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// 550, the file does not exist or cannot be accessed.
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// 550, the directory does not exist.
    #[display("550 Permanent directory not available")]
    PermanentDirectoryNotAvailable,
    /// 550, the directory still has content.
    #[display("550 The directory is not empty")]
    PermanentDirectoryNotEmpty,
    /// 550, access was denied.
    #[display("550 Permission denied")]
    PermissionDenied,
    /// 426, the data connection broke during a transfer.
    #[display("426 Connection closed transfer aborted")]
    ConnectionClosed,
    /// 451, an internal back-end error.
    #[display("451 Local error")]
    LocalError,
    /// 452, no space left.
    #[display("452 Insufficient storage space error")]
    InsufficientStorageSpace,
    /// 553, the name is not allowed (e.g. it already exists).
    #[display("553 File name not allowed error")]
    FileNameNotAllowed,
    /// 502, the back-end does not support the operation.
    #[display("502 Command not implemented")]
    CommandNotImplemented,
}

impl ErrorKind {
    /// The FTP reply code that corresponds with this kind of failure
    pub fn reply_code(self) -> u32 {
        match self {
            ErrorKind::TransientFileNotAvailable => 450,
            ErrorKind::PermanentFileNotAvailable
            | ErrorKind::PermanentDirectoryNotAvailable
            | ErrorKind::PermanentDirectoryNotEmpty
            | ErrorKind::PermissionDenied => 550,
            ErrorKind::ConnectionClosed => 426,
            ErrorKind::LocalError => 451,
            ErrorKind::InsufficientStorageSpace => 452,
            ErrorKind::FileNameNotAllowed => 553,
            ErrorKind::CommandNotImplemented => 502,
        }
    }

    /// The human readable part of the reply, without the code
    pub fn reply_text(self) -> String {
        let full = self.to_string();
        full.split_once(' ').map(|(_, text)| text.to_string()).unwrap_or(full)
    }
}
