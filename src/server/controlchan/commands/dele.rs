//! The RFC 959 Delete (`DELE`) command
//
// This command causes the file specified in the pathname to be
// deleted at the server site.  If an extra level of protection
// is desired (such as the query, "Do you really wish to delete?"),
// it should be provided by the user-FTP process.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        interceptor::Verdict,
    },
    storage::EntryType,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Dele;

#[async_trait]
impl CommandHandler for Dele {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&file));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) if !entry.is_collection() => {}
            Ok(Some(_)) => return Ok(Reply::new(ReplyCode::FileError, "Not a file")),
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => return Ok(Reply::from(&err)),
        }
        if ctx.intercept(&path, EntryType::Element, |i, op| i.on_delete(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().delete(&ctx.session.id, &path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File successfully removed")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
