//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data
// port (which is not its default data port) and to wait for a
// connection rather than initiate one upon receipt of a
// transfer command.  The response to this command includes the
// host and port address this server is listening on.

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct Pasv;

#[async_trait]
impl CommandHandler for Pasv {
    #[tracing_attributes::instrument(skip_all)]
    async fn handle(&self, ctx: &mut CommandContext<'_>, _arg: Option<String>) -> Result<Reply, ControlChanError> {
        let listener = match TcpListener::bind(SocketAddr::new(ctx.local_addr.ip(), 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                slog::warn!(ctx.logger, "Could not bind passive listener: {}", err);
                return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established"));
            }
        };
        let port = listener.local_addr()?.port();
        let host = match (ctx.server.passive_host, ctx.local_addr.ip()) {
            (Some(host), _) => host,
            (None, IpAddr::V4(ip)) => ip,
            (None, IpAddr::V6(ip)) => match ip.to_ipv4_mapped() {
                Some(ip) => ip,
                None => return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "PASV needs an IPv4 address, configure a passive host")),
            },
        };
        // Replaces the listener of an earlier PASV that was never used.
        ctx.session.passive = Some(listener);
        Ok(make_pasv_reply(host, port))
    }
}

pub(crate) fn make_pasv_reply(host: Ipv4Addr, port: u16) -> Reply {
    let octets = host.octets();
    let p1 = port >> 8;
    let p2 = port - (p1 * 256);
    Reply::new_with_string(
        ReplyCode::EnteringPassiveMode,
        format!("Entering Passive Mode ({},{},{},{},{},{})", octets[0], octets[1], octets[2], octets[3], p1, p2),
    )
}
