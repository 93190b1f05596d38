//! Uploads and downloads as explicit, caller-driven state machines.
//!
//! A [`Transfer`] moves one file in one direction. After [`start`](Transfer::start), every call
//! to [`perform`](Transfer::perform) moves at most one chunk; the caller loops until
//! [`complete`](Transfer::complete) (or [`aborted`](Transfer::aborted)) turns true. Calling
//! [`abort`](Transfer::abort) between steps makes the next step tear the transfer down. A
//! [`TransferListener`] only sees a shared reference, so it asks for the same through
//! [`request_abort`](Transfer::request_abort).

use super::{
    connection::{Connection, close_data},
    entry::{File, RemoteEntry},
    error::{FtpError, Result},
    transport::Transport,
};
use derive_more::Display;
use std::{
    cell::Cell,
    fmt,
    io::{self, Read, Write},
};

/// Bytes moved per [`Transfer::perform`] step.
pub const CHUNK_SIZE: usize = 8192;

/// The representation type used on the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferMode {
    /// `TYPE A`
    #[display("ASCII")]
    Ascii,
    /// `TYPE I`
    #[display("BINARY")]
    Binary,
}

impl TransferMode {
    /// The argument of the `TYPE` command
    pub fn type_code(&self) -> char {
        match self {
            TransferMode::Ascii => 'A',
            TransferMode::Binary => 'I',
        }
    }
}

/// Where a transfer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum TransferState {
    /// Not started yet
    Created = 0,
    /// Data connection open, moving chunks
    Started = 1,
    /// All bytes moved and confirmed by the server
    Completed = 2,
    /// Stopped by [`Transfer::abort`]
    Aborted = 3,
}

/// Observes a transfer. Every callback runs inline with the step that caused it.
///
/// Calling [`Transfer::request_abort`] from a callback stops the transfer at the next step.
pub trait TransferListener {
    /// The data connection is open
    fn started(&self, _transfer: &Transfer<'_>) {}
    /// A chunk was moved
    fn transferred(&self, _transfer: &Transfer<'_>) {}
    /// The server confirmed the transfer
    fn completed(&self, _transfer: &Transfer<'_>) {}
    /// The transfer failed with `error`, which is returned to the caller next
    fn failed(&self, _transfer: &Transfer<'_>, _error: &FtpError) {}
    /// The transfer was torn down after an abort
    fn aborted(&self, _transfer: &Transfer<'_>) {}
}

enum Direction<'a> {
    Download(Box<dyn Write + 'a>),
    Upload(Box<dyn Read + 'a>),
}

/// One upload or download of a single file.
pub struct Transfer<'a> {
    remote: File,
    local: String,
    direction: Direction<'a>,
    mode: TransferMode,
    socket: Option<Box<dyn Transport>>,
    state: TransferState,
    transferred: u64,
    buffer: Vec<u8>,
    listener: Option<&'a dyn TransferListener>,
    abort_requested: Cell<bool>,
}

impl<'a> Transfer<'a> {
    fn new(remote: &File, direction: Direction<'a>) -> Self {
        Transfer {
            remote: remote.clone(),
            local: "local stream".to_string(),
            direction,
            mode: TransferMode::Binary,
            socket: None,
            state: TransferState::Created,
            transferred: 0,
            buffer: vec![0; CHUNK_SIZE],
            listener: None,
            abort_requested: Cell::new(false),
        }
    }

    /// Prepares a download of `remote` into `sink`.
    pub fn download<W: Write + 'a>(remote: &File, sink: W) -> Self {
        Transfer::new(remote, Direction::Download(Box::new(sink)))
    }

    /// Prepares an upload from `source` to `remote`.
    pub fn upload<R: Read + 'a>(remote: &File, source: R) -> Self {
        Transfer::new(remote, Direction::Upload(Box::new(source)))
    }

    /// Reports progress to `listener`.
    pub fn with_listener(mut self, listener: &'a dyn TransferListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Names the local side in messages, e.g. a file path.
    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local = name.into();
        self
    }

    /// The remote file
    pub fn remote(&self) -> &File {
        &self.remote
    }

    /// The representation type of the transfer
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// The current state
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Bytes moved so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Bytes to move: the remote size for downloads, `-1` (unknown) for uploads.
    pub fn size(&self) -> i64 {
        match self.direction {
            Direction::Download(_) => self.remote.size() as i64,
            Direction::Upload(_) => -1,
        }
    }

    /// Whether all bytes were moved
    pub fn complete(&self) -> bool {
        self.state == TransferState::Completed
    }

    /// Whether the transfer was aborted
    pub fn aborted(&self) -> bool {
        self.state == TransferState::Aborted
    }

    /// Whether this is an upload
    pub fn is_upload(&self) -> bool {
        matches!(self.direction, Direction::Upload(_))
    }

    /// Where the bytes come from
    pub fn source_name(&self) -> &str {
        if self.is_upload() { &self.local } else { self.remote.name() }
    }

    /// Where the bytes go to
    pub fn target_name(&self) -> &str {
        if self.is_upload() { self.remote.name() } else { &self.local }
    }

    fn notify(&self, event: impl FnOnce(&dyn TransferListener, &Self)) {
        if let Some(listener) = self.listener {
            event(listener, self);
        }
    }

    /// Sets the representation type, opens the data connection and issues `RETR` or `STOR`.
    pub fn start(&mut self, conn: &mut Connection, mode: TransferMode) -> Result<()> {
        if self.state != TransferState::Created {
            return Err(FtpError::IllegalState(format!("Transfer of {} already {}", self.remote.name(), self.state)));
        }
        conn.command(&format!("TYPE {}", mode.type_code()), &[200])?;
        let mut socket = conn.transfer_socket()?;
        let verb = if self.is_upload() { "STOR" } else { "RETR" };
        if let Err(e) = conn.command(&format!("{} {}", verb, self.remote.name()), &[150]) {
            close_data(socket.as_mut(), conn.log());
            return Err(e);
        }

        slog::debug!(conn.log(), "Transfer started"; "from" => self.source_name(), "to" => self.target_name(), "mode" => %mode);
        self.socket = Some(socket);
        self.mode = mode;
        self.transferred = 0;
        self.state = TransferState::Started;
        self.notify(|l, t| l.started(t));
        Ok(())
    }

    /// Marks the transfer as aborted; the next [`perform`](Self::perform) releases the data
    /// connection. Aborting a completed transfer does nothing.
    pub fn abort(&mut self) {
        if self.state != TransferState::Completed {
            self.state = TransferState::Aborted;
        }
    }

    /// Asks for an abort through a shared reference, e.g. from a [`TransferListener`] callback.
    /// It takes effect at the start of the next [`perform`](Self::perform), which then behaves
    /// as if [`abort`](Self::abort) had been called.
    pub fn request_abort(&self) {
        self.abort_requested.set(true);
    }

    /// Advances the transfer by one step.
    pub fn perform(&mut self, conn: &mut Connection) -> Result<()> {
        if self.abort_requested.take() && self.state == TransferState::Started {
            self.abort();
        }
        match self.state {
            TransferState::Started => self.step(conn),
            TransferState::Completed => Err(FtpError::IllegalState("Transfer finished".to_string())),
            TransferState::Aborted => {
                self.close(conn, &[226, 426, 451])?;
                self.notify(|l, t| l.aborted(t));
                Ok(())
            }
            TransferState::Created => {
                if let Err(e) = self.close(conn, &[226]) {
                    slog::debug!(conn.log(), "Closing unstarted transfer failed: {}", e);
                }
                let err = FtpError::IllegalState(format!("Transfer of {} was never started", self.remote.name()));
                self.notify(|l, t| l.failed(t, &err));
                Err(err)
            }
        }
    }

    /// Starts the transfer and drives it until it is complete.
    pub fn run(&mut self, conn: &mut Connection, mode: TransferMode) -> Result<()> {
        self.start(conn, mode)?;
        while !self.complete() {
            self.perform(conn)?;
            if self.aborted() {
                return Err(FtpError::TransferAborted {
                    source_name: self.source_name().to_string(),
                    target: self.target_name().to_string(),
                    mode: self.mode.to_string(),
                });
            }
        }
        Ok(())
    }

    fn step(&mut self, conn: &mut Connection) -> Result<()> {
        let socket = self.socket.as_mut();
        let moved = match &mut self.direction {
            Direction::Download(sink) => download_chunk(socket, sink.as_mut(), &mut self.buffer),
            Direction::Upload(source) => upload_chunk(socket, source.as_mut(), &mut self.buffer),
        };

        match moved {
            Ok(0) => {
                self.state = TransferState::Completed;
                self.close(conn, &[226])?;
                if self.mode != TransferMode::Ascii {
                    conn.command("TYPE A", &[200])?;
                }
                slog::debug!(conn.log(), "Transfer complete"; "bytes" => self.transferred);
                self.notify(|l, t| l.completed(t));
                Ok(())
            }
            Ok(n) => {
                self.transferred += n as u64;
                self.notify(|l, t| l.transferred(t));
                Ok(())
            }
            Err(e) => {
                let err = FtpError::io(format!("Transfer from {} to {} failed", self.source_name(), self.target_name()), e);
                self.notify(|l, t| l.failed(t, &err));
                if let Err(close_err) = self.close(conn, &[226, 426, 451]) {
                    slog::warn!(conn.log(), "Closing failed transfer: {}", close_err);
                }
                Err(err)
            }
        }
    }

    // Releases the data connection and consumes the server's verdict on it.
    fn close(&mut self, conn: &mut Connection, acceptable: &[u32]) -> Result<()> {
        if let Some(mut socket) = self.socket.take() {
            close_data(socket.as_mut(), conn.log());
            conn.get_response()?.expect(acceptable)?;
        }
        Ok(())
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "data connection closed")
}

fn download_chunk(socket: Option<&mut Box<dyn Transport>>, sink: &mut dyn Write, buffer: &mut [u8]) -> io::Result<usize> {
    let socket = socket.ok_or_else(closed)?;
    let n = socket.read_binary(buffer)?;
    if n == 0 {
        sink.flush()?;
    } else {
        sink.write_all(&buffer[..n])?;
    }
    Ok(n)
}

fn upload_chunk(socket: Option<&mut Box<dyn Transport>>, source: &mut dyn Read, buffer: &mut [u8]) -> io::Result<usize> {
    let socket = socket.ok_or_else(closed)?;
    let n = loop {
        match source.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };
    if n > 0 {
        socket.write(&buffer[..n])?;
    }
    Ok(n)
}

impl fmt::Debug for Transfer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("remote", &self.remote.name())
            .field("upload", &self.is_upload())
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("transferred", &self.transferred)
            .finish()
    }
}
