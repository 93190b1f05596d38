//! Contains the [`Authenticator`] trait used by the FTP server to verify `USER`/`PASS` pairs.
//!
//! To plug in your own user database:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use ftpkit_core::auth::{AuthenticationError, Authenticator};
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

use crate::BoxError;
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Defines the requirements for Authentication implementations
#[async_trait]
pub trait Authenticator: Sync + Send + Debug {
    /// Checks the given credentials. `Ok(false)` means the credentials were rejected while an
    /// error means the check itself could not be carried out.
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthenticationError>;
}

/// The error type for authentication back-end failures
#[derive(Debug, Error)]
#[error("authentication error: {msg}")]
pub struct AuthenticationError {
    msg: String,
    #[source]
    source: Option<BoxError>,
}

impl AuthenticationError {
    /// Creates a new authentication error with a description
    pub fn new(msg: impl Into<String>) -> Self {
        AuthenticationError { msg: msg.into(), source: None }
    }

    /// Creates a new authentication error wrapping the back-end failure
    pub fn with_source<E>(msg: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        AuthenticationError {
            msg: msg.into(),
            source: Some(source.into()),
        }
    }
}

impl From<std::io::Error> for AuthenticationError {
    fn from(err: std::io::Error) -> Self {
        AuthenticationError::with_source("I/O failure", err)
    }
}
