//! The RFC 959 Remove Directory (`RMD`) command
//
// This command causes the directory specified in the pathname
// to be removed as a directory (if the pathname is absolute)
// or as a subdirectory of the current working directory (if
// the pathname is relative).

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
pub struct Rmd;

#[async_trait]
impl CommandHandler for Rmd {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(dir) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&dir));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) if entry.is_collection() => {}
            Ok(Some(_)) => return Ok(Reply::new(ReplyCode::FileError, "Not a directory")),
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "Directory not found")),
            Err(err) => return Ok(Reply::from(&err)),
        }
        if ctx.intercept(&path, EntryType::Collection, |i, op| i.on_delete(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().delete(&ctx.session.id, &path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Folder successfully removed")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
