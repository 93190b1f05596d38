//! The RFC 959 Make Directory (`MKD`) command
//
// This command causes the directory specified in the pathname
// to be created as a directory (if the pathname is absolute)
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
pub struct Mkd;

#[async_trait]
impl CommandHandler for Mkd {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(dir) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&dir));
        if ctx.intercept(&path, EntryType::Collection, |i, op| i.on_create(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().create(&ctx.session.id, &path, EntryType::Collection).await {
            Ok(_) => Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{path}\" created"))),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
