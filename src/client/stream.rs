//! `std::io` streams over a remote file, for callers that want to pull or push bytes themselves.

use super::{
    connection::{Connection, close_data},
    entry::{File, RemoteEntry},
    error::Result,
    transport::Transport,
};
use std::io::{self, Read, Write};

// Opens a binary data connection and issues `verb` for `file`.
fn open(conn: &mut Connection, verb: &str, file: &File) -> Result<Box<dyn Transport>> {
    conn.command("TYPE I", &[200])?;
    let mut socket = conn.transfer_socket()?;
    if let Err(e) = conn.command(&format!("{} {}", verb, file.name()), &[150]) {
        close_data(socket.as_mut(), conn.log());
        return Err(e);
    }
    Ok(socket)
}

// Closes the data connection, restores ASCII mode and checks the transfer was confirmed.
fn finish(conn: &mut Connection, socket: &mut dyn Transport) -> Result<()> {
    close_data(socket, conn.log());
    let confirmation = conn.get_response()?;
    conn.command("TYPE A", &[200])?;
    confirmation.expect(&[226])?;
    Ok(())
}

/// Reads a remote file. Created by [`File::reader`].
#[derive(Debug)]
pub struct FtpReader<'a> {
    conn: &'a mut Connection,
    socket: Box<dyn Transport>,
    closed: bool,
}

impl FtpReader<'_> {
    /// Ends the download and consumes the server's confirmation.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        finish(self.conn, self.socket.as_mut())
    }
}

impl Read for FtpReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }
        self.socket.read_binary(buf)
    }
}

impl Drop for FtpReader<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            slog::warn!(self.conn.log(), "Closing download stream failed: {}", e);
        }
    }
}

/// Writes a remote file. Created by [`File::writer`].
#[derive(Debug)]
pub struct FtpWriter<'a> {
    conn: &'a mut Connection,
    file: &'a mut File,
    socket: Box<dyn Transport>,
    closed: bool,
}

impl FtpWriter<'_> {
    /// Ends the upload, consumes the server's confirmation and refreshes the file's metadata.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        finish(self.conn, self.socket.as_mut())?;
        self.file.refresh(self.conn)
    }
}

impl Write for FtpWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "stream closed"));
        }
        self.socket.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FtpWriter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            slog::warn!(self.conn.log(), "Closing upload stream failed: {}", e);
        }
    }
}

impl File {
    /// Opens a binary download of this file.
    pub fn reader<'a>(&self, conn: &'a mut Connection) -> Result<FtpReader<'a>> {
        let socket = open(conn, "RETR", self)?;
        Ok(FtpReader {
            conn,
            socket,
            closed: false,
        })
    }

    /// Opens a binary upload to this file, replacing its content.
    pub fn writer<'a>(&'a mut self, conn: &'a mut Connection) -> Result<FtpWriter<'a>> {
        let socket = open(conn, "STOR", self)?;
        Ok(FtpWriter {
            conn,
            file: self,
            socket,
            closed: false,
        })
    }
}
