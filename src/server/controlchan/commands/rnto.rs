//! The RFC 959 Rename To (`RNTO`) command

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
pub struct Rnto;

#[async_trait]
impl CommandHandler for Rnto {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let Some(from) = ctx.session.rename_from.take() else {
            return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please tell me what file you want to rename first"));
        };
        let to = ctx.realname(Some(&file));
        let entry_type = match ctx.storage().lookup(&ctx.session.id, &from).await {
            Ok(Some(entry)) => entry.entry_type,
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => return Ok(Reply::from(&err)),
        };
        if ctx.intercept(&to, entry_type, |i, op| i.on_rename(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().rename(&ctx.session.id, &from, &to).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Renamed")),
            Err(err) => {
                slog::warn!(ctx.logger, "Could not rename"; "from" => &from, "to" => &to, "error" => %err);
                Ok(Reply::from(&err))
            }
        }
    }
}
