//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the
// file, specified in the pathname, to the server- or user-DTP
// at the other end of the data connection.  The status and
// contents of the file at the server site shall be unaffected.

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
pub struct Retr;

#[async_trait]
impl CommandHandler for Retr {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let Some(listener) = ctx.session.passive.take() else {
            return Ok(datachan::not_opened());
        };
        let path = ctx.realname(Some(&file));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) if !entry.is_collection() => {}
            Ok(Some(_)) => return Ok(Reply::new(ReplyCode::FileError, "Not a file")),
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => return Ok(Reply::from(&err)),
        }
        if ctx.intercept(&path, EntryType::Element, |i, op| i.on_read(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        let input = match ctx.storage().get(&ctx.session.id, &path).await {
            Ok(input) => input,
            Err(err) => return Ok(Reply::from(&err)),
        };
        let opening = format!("Opening {} mode data connection for {}", ctx.session.transfer_type, file);
        ctx.reply(Reply::new_with_string(ReplyCode::FileStatusOkay, opening)).await?;
        Ok(datachan::send_stream(listener, ctx.server.data_connection_timeout, input, ctx.logger).await)
    }
}
