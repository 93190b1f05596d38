use super::{
    Reply, ReplyCode,
    codecs::FtpCodec,
    error::{ControlChanError, ControlChanErrorKind},
    handler::{CommandContext, ServerContext},
};
use crate::server::session::Session;

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// Serves one control connection until the client quits, hangs up or idles too long.
pub(crate) async fn serve(server: Arc<ServerContext>, tcp_stream: TcpStream, logger: slog::Logger) -> Result<(), ControlChanError> {
    let local_addr = tcp_stream.local_addr()?;
    let mut session = Session::new();
    let logger = logger.new(slog::o!("session" => session.id.clone()));

    let mut control = Framed::new(tcp_stream, FtpCodec::new());
    control.send(Reply::new(ReplyCode::ServiceReady, &server.greeting)).await?;

    // The control channel event loop
    slog::info!(logger, "Starting control loop");
    let result = loop {
        let incoming = match tokio::time::timeout(server.idle_session_timeout, control.next()).await {
            Ok(Some(Ok(parsed))) => parsed.map_err(ControlChanError::from),
            Ok(Some(Err(err))) => break Err(err),
            Ok(None) => {
                slog::info!(logger, "Client closed the control connection");
                break Ok(());
            }
            Err(_) => {
                slog::info!(logger, "Control connection timed out");
                Err(ControlChanError::new(ControlChanErrorKind::ControlChannelTimeout))
            }
        };

        let reply = match incoming {
            Ok(line) => {
                slog::debug!(logger, "Processing command"; "line" => ?line);
                let mut ctx = CommandContext {
                    server: &server,
                    session: &mut session,
                    control: &mut control,
                    local_addr,
                    logger: &logger,
                };
                match server.dispatcher.dispatch(&mut ctx, line).await {
                    Ok(reply) => reply,
                    Err(err) => handle_control_channel_error(&logger, err),
                }
            }
            Err(err) => handle_control_channel_error(&logger, err),
        };

        let close_connection = session.quitting || reply.code() == ReplyCode::ClosingControlConnection;
        if let Err(err) = control.send(reply).await {
            slog::warn!(logger, "Could not send reply to client");
            break Err(err);
        }
        if close_connection {
            break Ok(());
        }
    };

    server.storage.forget(&session.id);
    slog::info!(logger, "Control loop ended");
    result
}

fn handle_control_channel_error(logger: &slog::Logger, error: ControlChanError) -> Reply {
    slog::warn!(logger, "Control channel error: {}", error);
    match error.kind() {
        ControlChanErrorKind::Utf8Error => Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"),
        ControlChanErrorKind::InvalidCommand | ControlChanErrorKind::ParseError => {
            Reply::new(ReplyCode::CommandSyntaxError, "Command syntax error")
        }
        ControlChanErrorKind::AuthenticationError => Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"),
        ControlChanErrorKind::ControlChannelTimeout => {
            Reply::new(ReplyCode::ClosingControlConnection, "Session timed out. Closing control connection")
        }
        _ => Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"),
    }
}
