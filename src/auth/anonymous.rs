//! The default authenticator of [`Server`](crate::server::Server).

use super::{AuthenticationError, Authenticator};
use async_trait::async_trait;

/// Accepts every user name with any password, like an anonymous FTP site does.
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use libftpkit::auth::{AnonymousAuthenticator, Authenticator};
///
/// assert!(AnonymousAuthenticator.authenticate("anonymous", "guest@example.com").await.unwrap());
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    #[tracing_attributes::instrument(skip(self, _password))]
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<bool, AuthenticationError> {
        Ok(true)
    }
}
