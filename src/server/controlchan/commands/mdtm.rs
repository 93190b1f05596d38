//! The RFC 3659 File Modification Time (`MDTM`) command
//
// The FTP command, MODIFICATION TIME (MDTM), can be used to determine
// when a file in the server NVFS was last modified.

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;

const RFC3659_TIME: &str = "%Y%m%d%H%M%S";

#[derive(Debug)]
pub struct Mdtm;

#[async_trait]
impl CommandHandler for Mdtm {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(file) = arg else {
            return Ok(super::missing_argument());
        };
        let path = ctx.realname(Some(&file));
        match ctx.storage().lookup(&ctx.session.id, &path).await {
            Ok(Some(entry)) => Ok(Reply::new_with_string(
                ReplyCode::FileStatus,
                entry.modified.format(RFC3659_TIME).to_string(),
            )),
            Ok(None) => Ok(Reply::new(ReplyCode::FileError, "File not found")),
            Err(err) => Ok(Reply::from(&err)),
        }
    }
}
