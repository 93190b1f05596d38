//! libftpkit is an FTP protocol stack.
//!
//! The [`client`] module holds a blocking client that understands Unix, Windows and MLSx
//! directory listings and drives uploads and downloads as explicit state machines. The
//! [`server`] module holds a small asynchronous server built on tokio that serves any
//! [`storage::Storage`] back-end to authenticated users.
//!
//! Serving a local directory:
//!
//! ```no_run
//! use libftpkit::{server::Server, storage::Filesystem};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::new(Filesystem::new("/srv/ftp")?).greeting("Welcome to my FTP server");
//! server.listen("127.0.0.1:2121").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod server;
pub mod storage;
