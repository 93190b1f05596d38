//! Parsers turning one line of directory listing output into an [`Entry`].
//!
//! Servers speak one of three dialects: Unix `ls -l` style, Windows/IIS style, or the RFC 3659
//! fact format of `MLSD`/`MLST`. The connection picks Unix or Windows from the `SYST` reply;
//! MLSx has to be selected explicitly.

mod mlsx;
mod unix;
mod windows;

use super::{entry::Entry, error::Result};
use chrono::NaiveDateTime;
use derive_more::Display;

pub use unix::permissions_from_mode;

/// The listing dialects understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ListingParser {
    /// `drwxr-xr-x  2 user group 4096 Apr  4  2009 name`
    Unix,
    /// `01-04-06  04:51PM       <DIR>          name`
    Windows,
    /// `type=dir;modify=20190219174820;UNIX.mode=0755; name`
    #[display("MLSx")]
    Mlsx,
}

impl ListingParser {
    /// Parses `raw` into an entry whose name is `base` followed by the listed filename.
    /// Unix compact dates that omit the year are resolved relative to `reference`, which
    /// defaults to the current local time.
    pub fn entry_from(&self, raw: &str, base: &str, reference: Option<NaiveDateTime>) -> Result<Entry> {
        match self {
            ListingParser::Unix => unix::parse(raw, base, reference),
            ListingParser::Windows => windows::parse(raw, base),
            ListingParser::Mlsx => mlsx::parse(raw, base),
        }
    }

    /// The command that lists a directory in this dialect.
    pub fn list_command(&self) -> &'static str {
        match self {
            ListingParser::Mlsx => "MLSD",
            ListingParser::Unix | ListingParser::Windows => "LIST -a",
        }
    }

    /// The parser for `LIST` output. Servers answer `LIST` in `ls -l` style even when they
    /// speak MLSx.
    pub fn long_listing(&self) -> ListingParser {
        match self {
            ListingParser::Mlsx => ListingParser::Unix,
            other => *other,
        }
    }
}
