//! Contains the [`Authenticator`] trait the FTP server checks `USER`/`PASS` pairs with, and
//! two ready-made implementations.
//!
//! Implement [`Authenticator`] to plug in your own user database:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use libftpkit::auth::{AuthenticationError, Authenticator};
//!
//! #[derive(Debug)]
//! struct OnlyAlice;
//!
//! #[async_trait]
//! impl Authenticator for OnlyAlice {
//!     async fn authenticate(&self, username: &str, _password: &str) -> Result<bool, AuthenticationError> {
//!         Ok(username == "alice")
//!     }
//! }
//! ```

mod anonymous;
mod user_list;

pub use anonymous::AnonymousAuthenticator;
pub use ftpkit_core::auth::{AuthenticationError, Authenticator};
pub use user_list::UserList;
