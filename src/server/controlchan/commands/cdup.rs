//! The RFC 959 Change To Parent Directory (`CDUP`) command
//
// This command is a special case of CWD, and is included to
// simplify the implementation of programs for transferring
// directory trees between operating systems having different
// syntaxes for naming the parent directory.  The reply codes
// shall be identical to the reply codes of CWD.

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
pub struct Cdup;

#[async_trait]
impl CommandHandler for Cdup {
    #[tracing_attributes::instrument(skip_all)]
    async fn handle(&self, ctx: &mut CommandContext<'_>, _arg: Option<String>) -> Result<Reply, ControlChanError> {
        let path = ctx.realname(Some(".."));
        if ctx.intercept(&path, EntryType::Collection, |i, op| i.on_cwd(op)) == Verdict::Deny {
            return Ok(super::permission_denied());
        }
        match ctx.storage().set_base(&ctx.session.id, &path).await {
            Ok(_) => Ok(Reply::new(ReplyCode::FileActionOkay, "CDUP command successful")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
