//! Contains code pertaining to the FTP *control* channel

mod codecs;
mod commands;
mod control_loop;
pub(crate) mod error;
pub(crate) mod handler;
mod line_parser;
mod reply;

pub(crate) use control_loop::serve;
pub(crate) use reply::{Reply, ReplyCode};
