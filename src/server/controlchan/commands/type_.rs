//! The RFC 959 Representation Type (`TYPE`) command
//
// The argument specifies the representation type as described
// in the Section on Data Representation and Storage.  Several
// types take a second parameter.  The first parameter is
// denoted by a single Telnet character, as is the second
// Format parameter for ASCII and EBCDIC; the second parameter
// for local byte is a decimal integer to indicate Bytesize.
// The parameters are separated by a <SP> (Space, ASCII code
// 32).
//
// The following codes are assigned for type:
//
//           \    /
// A - ASCII |    | N - Non-print
//           |-><-| T - Telnet format effectors
// E - EBCDIC|    | C - Carriage Control (ASA)
//           /    \
// I - Image
//
// L <byte size> - Local byte Byte size
//
//
// The default representation type is ASCII Non-print.  If the
// Format parameter is changed, and later just the first
// argument is changed, Format then returns to the Non-print
// default.

use crate::server::{
    controlchan::{
        Reply, ReplyCode,
        error::ControlChanError,
        handler::{CommandContext, CommandHandler},
    },
    session::TransferType,
};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Type;

#[async_trait]
impl CommandHandler for Type {
    #[tracing_attributes::instrument(skip(self, ctx))]
    async fn handle(&self, ctx: &mut CommandContext<'_>, arg: Option<String>) -> Result<Reply, ControlChanError> {
        let transfer_type = match arg.as_deref().map(|a| a.trim().to_ascii_uppercase()).as_deref() {
            Some("A") | Some("A N") => TransferType::Ascii,
            Some("I") | Some("L 8") => TransferType::Image,
            Some(_) => return Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Type not implemented")),
            None => return Ok(super::missing_argument()),
        };
        ctx.session.transfer_type = transfer_type;
        Ok(Reply::new_with_string(ReplyCode::CommandOkay, format!("Switching to {transfer_type} mode")))
    }
}
