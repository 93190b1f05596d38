//! The RFC 959 Store (`STOR`) command
//
// This command causes the server-DTP to accept the data
// transferred via the data connection and to store the data as
// a file at the server site.  If the file specified in the
// pathname exists at the server site, then its contents shall
// be replaced by the data being transferred.  A new file is
// created at the server site if the file specified in the
// pathname does not already exist.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        datachan,
        interceptor::Verdict,
    },
    storage::EntryType,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stor;

#[async_trait]
impl CommandHandler for Stor {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let Some(listener) = ctx.session.passive.take() else {
            return Ok(datachan::not_opened());
        };
        let path = ctx.realname(Some(&file));
        let exists = match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) if entry.is_collection() => return Ok(Reply::new(ReplyCode::FileError, "Is a directory")),
            Ok(found) => found.is_some(),
            Err(err) => return Ok(Reply::from(&err)),
        };
        if !exists && ctx.intercept(&path, EntryType::Element, |i, op| i.on_create(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        let opening = format!("Opening {} mode data connection for {}", ctx.session.transfer_type, file);
        ctx.reply(Reply::new_with_string(ReplyCode::FileStatusOkay, opening)).await?;

        let (storage, client, target) = (ctx.storage(), ctx.session.id.as_str(), path.as_str());
        let store = move |input| storage.put(client, target, input);
        let reply = datachan::receive(listener, ctx.server.data_connection_timeout, store, ctx.logger).await;
        if reply.code() == ReplyCode::ClosingDataConnection {
            ctx.notify(&path, EntryType::Element, |i, op| i.on_stored(op));
        }
        Ok(reply)
    }
}
