//! The sockets underneath a [`Connection`](super::Connection).
//!
//! A [`Transport`] is a blocking, line and byte oriented socket. The [`Connector`] decides which
//! transport implementation backs the control and data channels, which is also the seam tests
//! use to put a scripted server behind a connection.

use super::dsn::{Endpoint, Scheme};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned, pki_types::ServerName};
use slog::Drain;
use std::{
    fmt::Debug,
    io::{self, BufRead, BufReader, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    sync::Arc,
    time::Duration,
};

/// A blocking socket as used by the client.
pub trait Transport: Send + Debug {
    /// Opens the socket, waiting at most `timeout` for the connection to be established.
    fn connect(&mut self, timeout: Duration) -> io::Result<()>;

    /// Reads one line including its terminator. Returns what was read before the peer closed the
    /// connection when no terminator arrived, which is the empty string at EOF.
    fn read_line(&mut self) -> io::Result<String>;

    /// Reads up to `buf.len()` bytes, returning 0 at EOF.
    fn read_binary(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all bytes.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Closes the socket. Closing a closed socket does nothing.
    fn close(&mut self) -> io::Result<()>;

    /// Whether the peer closed its side.
    fn eof(&self) -> bool;

    /// Whether the socket is open.
    fn is_connected(&self) -> bool;

    /// Where this socket connects to.
    fn remote_endpoint(&self) -> &Endpoint;
}

/// Creates the transports of a connection.
pub trait Connector: Send + Sync + Debug {
    /// An unconnected transport for the control channel.
    fn control(&self, endpoint: &Endpoint, scheme: Scheme) -> Box<dyn Transport>;

    /// An unconnected transport for a data channel.
    fn data(&self, endpoint: &Endpoint) -> Box<dyn Transport>;
}

/// Uses TCP for `ftp` and data channels, TLS for `ftps` control channels.
#[derive(Debug, Default)]
pub struct DefaultConnector;

impl Connector for DefaultConnector {
    fn control(&self, endpoint: &Endpoint, scheme: Scheme) -> Box<dyn Transport> {
        match scheme {
            Scheme::Ftp => Box::new(TcpTransport::new(endpoint.clone())),
            Scheme::Ftps => Box::new(TlsTransport::new(endpoint.clone())),
        }
    }

    fn data(&self, endpoint: &Endpoint) -> Box<dyn Transport> {
        Box::new(TcpTransport::new(endpoint.clone()))
    }
}

fn open_tcp(endpoint: &Endpoint, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = io::Error::new(io::ErrorKind::NotFound, format!("{endpoint} did not resolve"));
    for addr in (endpoint.host(), endpoint.port()).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "socket is not connected")
}

// Shared by both transports: a buffered stream plus EOF bookkeeping.
#[derive(Debug)]
struct Buffered<S: Read + Write> {
    stream: Option<BufReader<S>>,
    eof: bool,
}

impl<S: Read + Write> Buffered<S> {
    fn new() -> Self {
        Buffered { stream: None, eof: false }
    }

    fn attach(&mut self, stream: S) {
        self.stream = Some(BufReader::new(stream));
        self.eof = false;
    }

    fn read_line(&mut self) -> io::Result<String> {
        let reader = self.stream.as_mut().ok_or_else(not_connected)?;
        let mut raw = Vec::new();
        reader.read_until(b'\n', &mut raw)?;
        if !raw.ends_with(b"\n") {
            self.eof = true;
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn read_binary(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let reader = self.stream.as_mut().ok_or_else(not_connected)?;
        let n = reader.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?.get_mut();
        stream.write_all(bytes)?;
        stream.flush()
    }
}

/// A plain TCP socket.
#[derive(Debug)]
pub struct TcpTransport {
    endpoint: Endpoint,
    inner: Buffered<TcpStream>,
}

impl TcpTransport {
    /// Creates an unconnected socket for the given endpoint
    pub fn new(endpoint: Endpoint) -> Self {
        TcpTransport {
            endpoint,
            inner: Buffered::new(),
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, timeout: Duration) -> io::Result<()> {
        let stream = open_tcp(&self.endpoint, timeout)?;
        stream.set_nodelay(true)?;
        self.inner.attach(stream);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.inner.read_line()
    }

    fn read_binary(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_binary(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write(bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(reader) = self.inner.stream.take() {
            match reader.get_ref().shutdown(Shutdown::Both) {
                Err(e) if e.kind() != io::ErrorKind::NotConnected => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    fn eof(&self) -> bool {
        self.inner.eof
    }

    fn is_connected(&self) -> bool {
        self.inner.stream.is_some()
    }

    fn remote_endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// A TCP socket with TLS negotiated right after connecting, verified against the platform's
/// trust store.
#[derive(Debug)]
pub struct TlsTransport {
    endpoint: Endpoint,
    config: Option<Arc<ClientConfig>>,
    inner: Buffered<StreamOwned<ClientConnection, TcpStream>>,
    logger: slog::Logger,
}

impl TlsTransport {
    /// Creates an unconnected socket for the given endpoint
    pub fn new(endpoint: Endpoint) -> Self {
        TlsTransport {
            endpoint,
            config: None,
            inner: Buffered::new(),
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
        }
    }

    /// Uses the given client configuration instead of the platform trust store.
    pub fn with_config(endpoint: Endpoint, config: Arc<ClientConfig>) -> Self {
        TlsTransport {
            config: Some(config),
            ..TlsTransport::new(endpoint)
        }
    }

    /// Logs to the given logger instead of the `log` crate facade.
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    fn native_config() -> io::Result<Arc<ClientConfig>> {
        let mut roots = RootCertStore::empty();
        let found = rustls_native_certs::load_native_certs();
        let (added, _ignored) = roots.add_parsable_certificates(found.certs);
        if added == 0 {
            return Err(io::Error::other("no usable root certificates found"));
        }
        Ok(Arc::new(ClientConfig::builder().with_root_certificates(roots).with_no_client_auth()))
    }
}

impl Transport for TlsTransport {
    fn connect(&mut self, timeout: Duration) -> io::Result<()> {
        let config = match &self.config {
            Some(config) => Arc::clone(config),
            None => TlsTransport::native_config()?,
        };
        let server_name =
            ServerName::try_from(self.endpoint.host().to_string()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let connection = ClientConnection::new(config, server_name).map_err(io::Error::other)?;
        let tcp = open_tcp(&self.endpoint, timeout)?;
        self.inner.attach(StreamOwned::new(connection, tcp));
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.inner.read_line()
    }

    fn read_binary(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_binary(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write(bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(reader) = self.inner.stream.take() {
            let mut stream = reader.into_inner();
            stream.conn.send_close_notify();
            if let Err(e) = stream.conn.complete_io(&mut stream.sock) {
                slog::debug!(self.logger, "Sending TLS close_notify failed: {}", e);
            }
            match stream.sock.shutdown(Shutdown::Both) {
                Err(e) if e.kind() != io::ErrorKind::NotConnected => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    fn eof(&self) -> bool {
        self.inner.eof
    }

    fn is_connected(&self) -> bool {
        self.inner.stream.is_some()
    }

    fn remote_endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}
