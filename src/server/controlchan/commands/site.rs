//! The RFC 959 Site Parameters (`SITE`) command
//
// This command is used by the server to provide services
// specific to his system that are essential to file transfer
// but not sufficiently universal to be included as commands in
// the protocol.  The nature of these services and the
// specification of their syntax can be stated in a reply to
// the HELP SITE command.
//
// Only `SITE CHMOD <octal mode> <path>` is understood.

use crate::server::{
    controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    interceptor::Verdict,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Site;

#[async_trait]
impl CommandHandler for Site {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(arg) = arg else {
            return Ok(super::missing_argument());
        };
        let mut parts = arg.splitn(3, ' ');
        match (parts.next().map(str::to_ascii_uppercase).as_deref(), parts.next(), parts.next()) {
            (Some("CHMOD"), Some(mode), Some(file)) => match u32::from_str_radix(mode, 8) {
                Ok(mode) if mode <= 0o7777 => chmod(ctx, mode, file).await,
                _ => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid mode")),
            },
            (Some("CHMOD"), _, _) => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Usage: SITE CHMOD <mode> <path>")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unknown SITE command")),
        }
    }
}

async fn chmod(ctx: &mut CommandContext<'_>, mode: u32, file: &str) -> Result<Reply, ControlChanError> {
    let path = ctx.realname(Some(file));
    let entry_type = match ctx.storage().lookup(&ctx.session.id, &path).await {
        Ok(Some(entry)) => entry.entry_type,
        Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "File not found")),
        Err(err) => return Ok(Reply::from(&err)),
    };
    if ctx.intercept(&path, entry_type, |i, op| i.on_change_permissions(op)) == Verdict::Deny {
        return Ok(super::permission_denied());
    }
    match ctx.storage().set_permissions(&ctx.session.id, &path, mode).await {
        Ok(()) => Ok(Reply::new(ReplyCode::CommandOkay, "SITE CHMOD command successful")),
        Err(err) => Ok(Reply::from(&err)),
    }
}
