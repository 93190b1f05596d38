//! The RFC 3659 File Size (`SIZE`) command
//
// The FTP command, SIZE OF FILE (SIZE), is used to obtain the transfer
// size of a file from the server-FTP process.  This is the exact number
// of octets (8 bit bytes) that would be transmitted over the data
// connection should that file be transmitted.

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Size;

#[async_trait]
impl CommandHandler for Size {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&file));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) => Ok(Reply::new_with_string(ReplyCode::FileStatus, entry.size.to_string())),
            Ok(None) => Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
