//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's
// password.  This command must be immediately preceded by the
// user name command, and, for some sites, completes the user's
// identification for access control.  Since password
// information is quite sensitive, it is desirable in general
// to "mask" it or suppress typeout.  It appears that the
// server has no foolproof way to achieve this.  It is
// therefore the responsibility of the user-FTP process to hide
// the sensitive password information.

use crate::server::{
    controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    session::SessionState,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pass;

#[async_trait]
impl CommandHandler for Pass {
    #[tracing_attributes::instrument(skip(self, ctx, arg))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        if ctx.session.state != SessionState::WaitPass {
            return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please give me a username first"));
        }
        let username = ctx.session.username.clone().unwrap_or_default();
        let password = arg.unwrap_or_default();
        match ctx.server.authenticator.authenticate(&username, &password).await {
            Ok(true) => {
                slog::info!(ctx.logger, "User logged in"; "username" => &username);
                ctx.session.state = SessionState::WaitCmd;
                Ok(Reply::new(ReplyCode::UserLoggedIn, "User logged in, proceed"))
            }
            Ok(false) => {
                slog::warn!(ctx.logger, "Login rejected"; "username" => &username);
                ctx.session.state = SessionState::New;
                Ok(Reply::new(ReplyCode::NotLoggedIn, "Wrong username or password"))
            }
            Err(err) => {
                ctx.session.state = SessionState::New;
                Err(err.into())
            }
        }
    }
}
