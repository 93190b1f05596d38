//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different
// directory or dataset for file storage or retrieval without
// altering his login or accounting information.  Transfer
// parameters are similarly unchanged.  The argument is a
// pathname specifying a directory or other system dependent
// file group designator.

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
pub struct Cwd;

#[async_trait]
impl CommandHandler for Cwd {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(dir) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&dir));
        if ctx.intercept(&path, EntryType::Collection, |i, op| i.on_cwd(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().set_base(&ctx.session.id, &path).await {
            Ok(base) => Ok(Reply::new_with_string(ReplyCode::FileActionOkay, format!("\"{base}\" is new working directory"))),
            Err(err) => {
                slog::debug!(ctx.logger, "Could not change directory"; "path" => &path, "error" => %err);
                Ok(Reply::from(&err))
            }
        }
    }
}
