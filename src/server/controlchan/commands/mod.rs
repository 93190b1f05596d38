//! This module contains the implementations for the FTP commands defined in
//!
//! - [RFC 959 - FTP](https://tools.ietf.org/html/rfc959)
//! - [RFC 3659 - Extensions to FTP](https://tools.ietf.org/html/rfc3659)
//! - [RFC 2389 - Feature negotiation mechanism for FTP](https://tools.ietf.org/html/rfc2389)

mod cdup;
mod cwd;
mod dele;
mod feat;
mod list;
mod mdtm;
mod mkd;
mod mlsd;
mod noop;
mod pass;
mod pasv;
mod pwd;
mod quit;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod site;
mod size;
mod stor;
mod syst;
mod type_;
mod user;

pub use cdup::Cdup;
pub use cwd::Cwd;
pub use dele::Dele;
pub use feat::Feat;
pub use list::List;
pub use mdtm::Mdtm;
pub use mkd::Mkd;
pub use mlsd::Mlsd;
pub use noop::Noop;
pub use pass::Pass;
pub use pasv::Pasv;
pub use pwd::Pwd;
pub use quit::Quit;
pub use retr::Retr;
pub use rmd::Rmd;
pub use rnfr::Rnfr;
pub use rnto::Rnto;
pub use site::Site;
pub use size::Size;
pub use stor::Stor;
pub use syst::Syst;
pub use type_::Type;
pub use user::User;

use super::{Reply, ReplyCode};

fn missing_argument() -> Reply {
    Reply::new(ReplyCode::ParameterSyntaxError, "Missing argument")
}

fn permission_denied() -> Reply {
    Reply::new(ReplyCode::FileError, "Permission denied")
}
