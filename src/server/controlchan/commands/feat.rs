//! The RFC 2389 Feature (`FEAT`) command

use crate::server::controlchan::{
    Reply, ReplyCode,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Feat;

#[async_trait]
impl CommandHandler for Feat {
    #[tracing_attributes::instrument(skip_all)]
    async fn handle(&self, _ctx: &mut CommandContext<'_>, _arg: Option<String>) -> Result<Reply, ControlChanError> {
        // Each feature line must be indented by a space.
        let mut feat_text = vec![" MDTM", " MLSD", " SIZE", " UTF8", " SITE CHMOD"];
        // Show them in alphabetical order.
        feat_text.sort_unstable();
        feat_text.insert(0, "Extensions supported:");
        feat_text.push("END");
        Ok(Reply::new_multiline(ReplyCode::SystemStatus, feat_text))
    }
}
