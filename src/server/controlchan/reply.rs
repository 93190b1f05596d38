/// A reply to the FTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    CodeAndMsg { code: ReplyCode, msg: String },
    MultiLine { code: ReplyCode, lines: Vec<String> },
}

/// The reply codes according to RFC 959.
//
// From: https://cr.yp.to/ftp/request.html#response
//
// The three digits form a code. Codes between 100 and 199 indicate marks; codes between 200
// and 399 indicate acceptance; codes between 400 and 599 indicate rejection.
//
// The server can reject any request with code
// - 421 if the server is about to close the connection;
// - 500, 501, 502, or 504 for unacceptable syntax; or
// - 530 if permission is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReplyCode {
    FileStatusOkay = 150,

    CommandOkay = 200,
    SystemStatus = 211,
    FileStatus = 213,
    SystemType = 215,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    ClosingDataConnection = 226,
    EnteringPassiveMode = 227,
    UserLoggedIn = 230,
    FileActionOkay = 250,
    DirCreated = 257,

    NeedPassword = 331,
    FileActionPending = 350,

    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    TransientFileError = 450,
    LocalError = 451,
    OutOfSpace = 452,

    CommandSyntaxError = 500,
    ParameterSyntaxError = 501,
    CommandNotImplemented = 502,
    BadCommandSequence = 503,
    CommandNotImplementedForParameter = 504,
    NotLoggedIn = 530,
    FileError = 550,
    BadFileName = 553,
}

impl Reply {
    pub fn new(code: ReplyCode, message: &str) -> Self {
        Reply::CodeAndMsg {
            code,
            msg: message.to_string(),
        }
    }

    pub fn new_with_string(code: ReplyCode, msg: String) -> Self {
        Reply::CodeAndMsg { code, msg }
    }

    pub fn new_multiline<I>(code: ReplyCode, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        Reply::MultiLine {
            code,
            lines: lines.into_iter().map(|item| format!("{}", item)).collect(),
        }
    }

    /// The code the reply is sent with
    pub fn code(&self) -> ReplyCode {
        match self {
            Reply::CodeAndMsg { code, .. } | Reply::MultiLine { code, .. } => *code,
        }
    }
}

impl From<ftpkit_core::storage::ErrorKind> for ReplyCode {
    fn from(kind: ftpkit_core::storage::ErrorKind) -> Self {
        use ftpkit_core::storage::ErrorKind;
        match kind {
            ErrorKind::TransientFileNotAvailable => ReplyCode::TransientFileError,
            ErrorKind::PermanentFileNotAvailable
            | ErrorKind::PermanentDirectoryNotAvailable
            | ErrorKind::PermanentDirectoryNotEmpty
            | ErrorKind::PermissionDenied => ReplyCode::FileError,
            ErrorKind::ConnectionClosed => ReplyCode::ConnectionClosed,
            ErrorKind::LocalError => ReplyCode::LocalError,
            ErrorKind::InsufficientStorageSpace => ReplyCode::OutOfSpace,
            ErrorKind::FileNameNotAllowed => ReplyCode::BadFileName,
            ErrorKind::CommandNotImplemented => ReplyCode::CommandNotImplemented,
        }
    }
}

impl From<&ftpkit_core::storage::Error> for Reply {
    fn from(err: &ftpkit_core::storage::Error) -> Self {
        Reply::new_with_string(err.kind().into(), err.kind().reply_text())
    }
}
