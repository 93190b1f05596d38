use super::{Reply, ReplyCode, codecs::FtpCodec, commands, error::ControlChanError, line_parser::Line};
use crate::{
    auth::Authenticator,
    server::{
        interceptor::{Interceptor, Interceptors, Operation, Verdict},
        session::Session,
    },
    storage::{EntryType, Storage},
};

use async_trait::async_trait;
use futures_util::SinkExt;
use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    result::Result,
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

#[async_trait]
pub(crate) trait CommandHandler: Send + Sync + std::fmt::Debug {
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError>;
}

// The settings every control connection of a server shares.
#[derive(Debug)]
pub(crate) struct ServerContext {
    pub storage: Arc<dyn Storage>,
    pub authenticator: Arc<dyn Authenticator>,
    pub interceptors: Interceptors,
    pub dispatcher: Dispatcher,
    pub greeting: String,
    pub passive_host: Option<Ipv4Addr>,
    pub idle_session_timeout: Duration,
    pub data_connection_timeout: Duration,
}

/// Convenience struct to group command args
pub(crate) struct CommandContext<'a> {
    pub server: &'a ServerContext,
    pub session: &'a mut Session,
    pub control: &'a mut Framed<TcpStream, FtpCodec>,
    pub local_addr: SocketAddr,
    pub logger: &'a slog::Logger,
}

impl CommandContext<'_> {
    // Sends a preliminary reply such as `150` ahead of the one the handler returns.
    pub async fn reply(&mut self, reply: Reply) -> Result<(), ControlChanError> {
        self.control.send(reply).await
    }

    pub fn storage(&self) -> &dyn Storage {
        self.server.storage.as_ref()
    }

    // The absolute virtual path for a client supplied path, the working directory when absent.
    pub fn realname(&self, uri: Option<&str>) -> String {
        self.storage().realname(&self.session.id, uri.unwrap_or("."))
    }

    pub fn intercept<F>(&self, path: &str, entry_type: EntryType, hook: F) -> Verdict
    where
        F: Fn(&dyn Interceptor, &Operation<'_>) -> Verdict,
    {
        let op = Operation {
            user: self.session.user(),
            path,
            entry_type,
        };
        let verdict = self.server.interceptors.check(&op, hook);
        if verdict == Verdict::Deny {
            slog::info!(self.logger, "Interceptor denied operation"; "path" => path, "user" => op.user);
        }
        verdict
    }

    pub fn notify<F>(&self, path: &str, entry_type: EntryType, hook: F)
    where
        F: Fn(&dyn Interceptor, &Operation<'_>),
    {
        let op = Operation {
            user: self.session.user(),
            path,
            entry_type,
        };
        self.server.interceptors.notify(&op, hook);
    }
}

// Verbs accepted before the client logged in.
const OPEN_VERBS: [&str; 6] = ["USER", "PASS", "SYST", "NOOP", "FEAT", "QUIT"];

/// Maps command verbs to their handlers.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut dispatcher = Dispatcher { handlers: HashMap::new() };
        dispatcher
            .register("USER", commands::User)
            .register("PASS", commands::Pass)
            .register("SYST", commands::Syst)
            .register("FEAT", commands::Feat)
            .register("NOOP", commands::Noop)
            .register("QUIT", commands::Quit)
            .register("PWD", commands::Pwd)
            .register("CWD", commands::Cwd)
            .register("CDUP", commands::Cdup)
            .register("TYPE", commands::Type)
            .register("PASV", commands::Pasv)
            .register("LIST", commands::List)
            .register("MLSD", commands::Mlsd)
            .register("RETR", commands::Retr)
            .register("STOR", commands::Stor)
            .register("DELE", commands::Dele)
            .register("RMD", commands::Rmd)
            .register("MKD", commands::Mkd)
            .register("RNFR", commands::Rnfr)
            .register("RNTO", commands::Rnto)
            .register("SIZE", commands::Size)
            .register("MDTM", commands::Mdtm)
            .register("SITE", commands::Site);
        dispatcher
    }

    fn register<H: CommandHandler + 'static>(&mut self, verb: &'static str, handler: H) -> &mut Self {
        self.handlers.insert(verb, Box::new(handler));
        self
    }

    pub async fn dispatch(&self, ctx: &mut CommandContext<'_>, line: Line) -> Result<Reply, ControlChanError> {
        let Some(handler) = self.handlers.get(line.verb.as_str()) else {
            return Ok(Reply::new(ReplyCode::CommandNotImplemented, "Command not implemented"));
        };
        if !ctx.session.logged_in() && !OPEN_VERBS.contains(&line.verb.as_str()) {
            return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate"));
        }
        handler.handle(ctx, line.arg).await
    }
}
