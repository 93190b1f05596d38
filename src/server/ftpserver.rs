use super::{
    controlchan::{
        self,
        handler::{Dispatcher, ServerContext},
    },
    error::ServerError,
    interceptor::{Interceptor, InterceptorCondition, Interceptors},
};
use crate::{
    auth::{AnonymousAuthenticator, Authenticator},
    storage::Storage,
};

use slog::Drain;
use std::{
    fmt::{self, Debug, Formatter},
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpListener;

/// The greeting sent to clients when they connect
pub const DEFAULT_GREETING: &str = "Welcome to the libftpkit FTP server";
/// How long a control connection may stay silent before it is closed
pub const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 600;
/// How long the server waits for the client to connect to a passive port
pub const DEFAULT_DATA_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// An instance of a FTP server. It serves files from a [`Storage`] back-end and checks logins
/// with an [`Authenticator`], anonymous access being the default.
///
/// The server can be started with the `listen` method.
///
/// # Example
///
/// ```no_run
/// use libftpkit::{server::Server, storage::Filesystem};
///
/// # async fn run() -> Result<(), libftpkit::server::ServerError> {
/// let server = Server::new(Filesystem::new("/srv/ftp")?)
///     .greeting("Welcome to my FTP server")
///     .passive_host([127, 0, 0, 1]);
/// server.listen("127.0.0.1:2121").await
/// # }
/// ```
pub struct Server {
    storage: Arc<dyn Storage>,
    authenticator: Arc<dyn Authenticator>,
    interceptors: Interceptors,
    greeting: String,
    passive_host: Option<Ipv4Addr>,
    idle_session_timeout: Duration,
    data_connection_timeout: Duration,
    logger: slog::Logger,
}

impl Server {
    /// Creates a server that serves from the given storage back-end.
    pub fn new<S: Storage + 'static>(storage: S) -> Self {
        Server {
            storage: Arc::new(storage),
            authenticator: Arc::new(AnonymousAuthenticator),
            interceptors: Interceptors::default(),
            greeting: DEFAULT_GREETING.to_string(),
            passive_host: None,
            idle_session_timeout: Duration::from_secs(DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            data_connection_timeout: Duration::from_secs(DEFAULT_DATA_CONNECTION_TIMEOUT_SECS),
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
        }
    }

    /// Set the [`Authenticator`] that will be used for authentication.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Set the greeting that will be sent to the client after connecting.
    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the structured logger to use
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        self.logger = logger.into().unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()));
        self
    }

    /// Set the idle session timeout in seconds. The default is 600 seconds.
    pub fn idle_session_timeout(mut self, secs: u64) -> Self {
        self.idle_session_timeout = Duration::from_secs(secs);
        self
    }

    /// Set how long to wait for the client to open a data connection. The default is 30 seconds.
    pub fn data_connection_timeout(mut self, secs: u64) -> Self {
        self.data_connection_timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the IP address announced in `PASV` replies, for servers behind NAT. By default the
    /// address the client connected to is used.
    pub fn passive_host<H: Into<Ipv4Addr>>(mut self, host: H) -> Self {
        self.passive_host = Some(host.into());
        self
    }

    /// Registers an interceptor, consulted for the operations `condition` accepts.
    pub fn interceptor<C, I>(mut self, condition: C, interceptor: I) -> Self
    where
        C: InterceptorCondition + 'static,
        I: Interceptor + 'static,
    {
        self.interceptors.add(Box::new(condition), Box::new(interceptor));
        self
    }

    /// Binds to the given address and serves clients until the task is dropped.
    pub async fn listen<T: Into<String>>(self, bind_address: T) -> Result<(), ServerError> {
        let bind_address: SocketAddr = bind_address.into().parse()?;
        let listener = TcpListener::bind(bind_address).await?;
        self.listen_prebound(listener).await
    }

    /// Serves clients connecting to an already bound listener.
    pub async fn listen_prebound(self, listener: TcpListener) -> Result<(), ServerError> {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening for control connections"; "address" => ?listener.local_addr()?);
        let server = Arc::new(self.into_context());
        loop {
            match listener.accept().await {
                Ok((tcp_stream, socket_addr)) => {
                    slog::info!(logger, "Incoming control connection from {:?}", socket_addr);
                    let server = Arc::clone(&server);
                    let logger = logger.new(slog::o!("peer" => socket_addr.to_string()));
                    tokio::spawn(async move {
                        if let Err(err) = controlchan::serve(server, tcp_stream, logger.clone()).await {
                            slog::warn!(logger, "Control connection ended with an error: {}", err);
                        }
                    });
                }
                Err(err) => {
                    slog::error!(logger, "Error accepting incoming control connection {:?}", err);
                }
            }
        }
    }

    fn into_context(self) -> ServerContext {
        ServerContext {
            storage: self.storage,
            authenticator: self.authenticator,
            interceptors: self.interceptors,
            dispatcher: Dispatcher::new(),
            greeting: self.greeting,
            passive_host: self.passive_host,
            idle_session_timeout: self.idle_session_timeout,
            data_connection_timeout: self.data_connection_timeout,
        }
    }
}

impl Debug for Server {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("storage", &self.storage)
            .field("authenticator", &self.authenticator)
            .field("interceptors", &self.interceptors)
            .field("greeting", &self.greeting)
            .field("passive_host", &self.passive_host)
            .field("idle_session_timeout", &self.idle_session_timeout)
            .field("data_connection_timeout", &self.data_connection_timeout)
            .finish()
    }
}
