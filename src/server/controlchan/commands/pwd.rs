//! The RFC 959 Print Working Directory (`PWD`) command
//
// This command causes the name of the current working
// directory to be returned in the reply.

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pwd;

#[async_trait]
impl CommandHandler for Pwd {
    #[tracing_attributes::instrument(skip_all)]
    async fn handle(&self, ctx: &mut CommandContext<'_>, _arg: Option<String>) -> Result<Reply, ControlChanError> {
        let cwd = ctx.storage().base(&ctx.session.id);
        Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{cwd}\" is current directory")))
    }
}
