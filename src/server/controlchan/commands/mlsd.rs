//! The RFC 3659 Machine List Directory (`MLSD`) command
//
// This command causes a listing to be sent from the server to the passive DTP.
// The server-DTP will send a list of the contents of the specified directory
// over the data connection. Each file entry is formatted using the machine-readable
// format defined in RFC 3659, making it much easier for FTP clients to parse
// compared to the traditional LIST command output.

use crate::{
    server::{
        controlchan::{
            Reply, ReplyCode,
            error::ControlChanError,
            handler::{CommandContext, CommandHandler},
        },
        datachan,
    },
    storage::{self, Storage},
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mlsd;

#[async_trait]
impl CommandHandler for Mlsd {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(listener) = ctx.session.passive.take() else {
            return Ok(datachan::not_opened());
        };
        let path = ctx.realname(arg.as_deref());
        let lines = match facts(ctx.storage(), &ctx.session.id, &path).await {
            Ok(Some(lines)) => lines,
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "No such directory")),
            Err(err) => return Ok(Reply::from(&err)),
        };
        ctx.reply(Reply::new(ReplyCode::FileStatusOkay, "Sending directory list")).await?;
        Ok(datachan::send_lines(listener, ctx.server.data_connection_timeout, &lines, ctx.logger).await)
    }
}

async fn facts(storage: &dyn Storage, client: &str, path: &str) -> storage::Result<Option<Vec<String>>> {
    let entry = match storage.lookup(client, path).await? {
        Some(entry) if entry.is_collection() => entry,
        _ => return Ok(None),
    };
    let parent = storage.lookup(client, &storage::parent(path)).await?.unwrap_or_else(|| entry.clone());
    let mut elements = storage.elements(client, path).await?;
    elements.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines = Vec::with_capacity(elements.len() + 2);
    lines.push(entry.facts_as("cdir", "."));
    lines.push(parent.facts_as("pdir", ".."));
    lines.extend(elements.iter().map(|element| element.facts(element.basename())));
    Ok(Some(lines))
}
