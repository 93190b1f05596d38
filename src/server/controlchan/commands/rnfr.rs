//! The RFC 959 Rename From (`RNFR`) command

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnfr;

#[async_trait]
impl CommandHandler for Rnfr {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&file));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(_)) => {
                ctx.session.rename_from = Some(path);
                Ok(Reply::new(ReplyCode::FileActionPending, "Tell me, what would you like the new name to be?"))
            }
            Ok(None) => Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
