//! Contains code pertaining to the FTP *data* channel
//
// The data channel is opened by `PASV` and consumed by the next transfer command. The control
// loop waits while the transfer runs, so replies stay in order without any messaging between
// tasks.

use super::controlchan::{Reply, ReplyCode};
use crate::storage::{self, ByteStream};

use std::{io, time::Duration};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};

/// Waits for the client to connect to the passive listener.
#[tracing_attributes::instrument(skip(listener))]
pub(crate) async fn accept(listener: TcpListener, timeout: Duration) -> io::Result<TcpStream> {
    match tokio::time::timeout(timeout, listener.accept()).await {
        Ok(Ok((socket, _))) => Ok(socket),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "client did not open the data connection")),
    }
}

pub(crate) fn not_opened() -> Reply {
    Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established")
}

/// Writes listing lines to the client and closes the data connection.
pub(crate) async fn send_lines(listener: TcpListener, timeout: Duration, lines: &[String], logger: &slog::Logger) -> Reply {
    let mut socket = match accept(listener, timeout).await {
        Ok(socket) => socket,
        Err(err) => return failed_to_open(logger, err),
    };
    let mut payload = String::with_capacity(lines.iter().map(|line| line.len() + 2).sum());
    for line in lines {
        payload.push_str(line);
        payload.push_str("\r\n");
    }
    let result = match socket.write_all(payload.as_bytes()).await {
        Ok(()) => socket.shutdown().await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => Reply::new_with_string(
            ReplyCode::ClosingDataConnection,
            format!("Closing data connection, sent {} entries", lines.len()),
        ),
        Err(err) => aborted(logger, err),
    }
}

/// Copies a storage stream to the client and closes the data connection.
pub(crate) async fn send_stream(listener: TcpListener, timeout: Duration, mut input: ByteStream, logger: &slog::Logger) -> Reply {
    let mut socket = match accept(listener, timeout).await {
        Ok(socket) => socket,
        Err(err) => return failed_to_open(logger, err),
    };
    let result = match tokio::io::copy(&mut input, &mut socket).await {
        Ok(bytes) => socket.shutdown().await.map(|_| bytes),
        Err(err) => Err(err),
    };
    match result {
        Ok(bytes) => {
            slog::debug!(logger, "Sent file"; "bytes" => bytes);
            Reply::new(ReplyCode::ClosingDataConnection, "Transfer complete")
        }
        Err(err) => aborted(logger, err),
    }
}

/// Hands whatever the client sends until it closes the data connection to `store`.
pub(crate) async fn receive<F, Fut>(listener: TcpListener, timeout: Duration, store: F, logger: &slog::Logger) -> Reply
where
    F: FnOnce(ByteStream) -> Fut,
    Fut: Future<Output = storage::Result<u64>>,
{
    let socket = match accept(listener, timeout).await {
        Ok(socket) => socket,
        Err(err) => return failed_to_open(logger, err),
    };
    match store(Box::new(socket)).await {
        Ok(bytes) => {
            slog::debug!(logger, "Stored file"; "bytes" => bytes);
            Reply::new(ReplyCode::ClosingDataConnection, "Transfer complete")
        }
        Err(err) => {
            slog::warn!(logger, "Could not store upload: {}", err);
            Reply::from(&err)
        }
    }
}

fn failed_to_open(logger: &slog::Logger, err: io::Error) -> Reply {
    slog::warn!(logger, "Could not open data connection: {}", err);
    Reply::new(ReplyCode::CantOpenDataConnection, "Can't open data connection")
}

fn aborted(logger: &slog::Logger, err: io::Error) -> Reply {
    slog::warn!(logger, "Data transfer aborted: {}", err);
    Reply::new(ReplyCode::ConnectionClosed, "Connection closed; transfer aborted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    #[tokio::test]
    async fn lines_are_crlf_terminated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move {
            let mut socket = TcpStream::connect(addr).await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let lines = vec!["a".to_string(), "b".to_string()];
        let reply = send_lines(listener, Duration::from_secs(5), &lines, &logger()).await;
        assert_eq!(reply.code(), ReplyCode::ClosingDataConnection);
        assert_eq!(client.await.unwrap(), "a\r\nb\r\n");
    }

    #[tokio::test]
    async fn accept_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let err = accept(listener, Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn missing_client_gets_425() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let input: ByteStream = Box::new(&b"data"[..]);
        let reply = send_stream(listener, Duration::from_millis(10), input, &logger()).await;
        assert_eq!(reply.code(), ReplyCode::CantOpenDataConnection);
    }
}
