//! The RFC 959 List (`LIST`) command
//
// This command causes a list to be sent from the server to the
// passive DTP.  If the pathname specifies a directory or other
// group of files, the server should transfer a list of files
// in the specified directory.  If the pathname specifies a
// file then the server should send current information on the
// file.  A null argument implies the user's current working or
// default directory.  The data transfer is over the data
// connection in type ASCII or type EBCDIC.  (The user must
// ensure that the TYPE is appropriately ASCII or EBCDIC).
// Since the information on a file may vary widely from system
// to system, this information may be hard to use automatically
// in a program, but may be quite useful to a human user.

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
use chrono::Local;

#[derive(Debug)]
pub struct List;

#[async_trait]
impl CommandHandler for List {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let Some(listener) = ctx.session.passive.take() else {
            return Ok(datachan::not_opened());
        };
        let (options, path) = split_options(arg.as_deref());
        let path = ctx.realname(path);
        let lines = match long_listing(ctx.storage(), &ctx.session.id, &path, options.contains('d')).await {
            Ok(Some(lines)) => lines,
            Ok(None) => return Ok(Reply::new(ReplyCode::FileError, "No such file or directory")),
            Err(err) => return Ok(Reply::from(&err)),
        };
        ctx.reply(Reply::new(ReplyCode::FileStatusOkay, "Sending directory list")).await?;
        Ok(datachan::send_lines(listener, ctx.server.data_connection_timeout, &lines, ctx.logger).await)
    }
}

// Splits `-al some/path` into the option letters and the path. Paths may contain spaces.
fn split_options(arg: Option<&str>) -> (String, Option<&str>) {
    let mut options = String::new();
    let mut rest = arg.unwrap_or_default().trim_start();
    while rest.starts_with('-') {
        let end = rest.find(' ').unwrap_or(rest.len());
        options.push_str(&rest[1..end]);
        rest = rest[end..].trim_start();
    }
    (options, if rest.is_empty() { None } else { Some(rest) })
}

// `ls -l` style lines for `path`, `None` when it does not exist. Directories are listed with
// their `.` and `..` entries unless `directory_itself` is set.
async fn long_listing(storage: &dyn Storage, client: &str, path: &str, directory_itself: bool) -> storage::Result<Option<Vec<String>>> {
    let Some(entry) = storage.lookup(client, path).await? else {
        return Ok(None);
    };
    let now = Local::now().naive_local();
    if !entry.is_collection() || directory_itself {
        return Ok(Some(vec![entry.long_repr(entry.basename(), now)]));
    }

    let parent = storage.lookup(client, &storage::parent(path)).await?.unwrap_or_else(|| entry.clone());
    let mut elements = storage.elements(client, path).await?;
    elements.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines = Vec::with_capacity(elements.len() + 2);
    lines.push(entry.long_repr(".", now));
    lines.push(parent.long_repr("..", now));
    lines.extend(elements.iter().map(|element| element.long_repr(element.basename(), now)));
    Ok(Some(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(None, "", None)]
    #[case(Some("-a"), "a", None)]
    #[case(Some("-a /htdocs/"), "a", Some("/htdocs/"))]
    #[case(Some("-al -d /a dir"), "ald", Some("/a dir"))]
    #[case(Some("index.html"), "", Some("index.html"))]
    fn options_are_split_from_the_path(#[case] arg: Option<&str>, #[case] options: &str, #[case] path: Option<&str>) {
        assert_eq!(split_options(arg), (options.to_string(), path));
    }
}
