//! An authenticator over a fixed set of credentials

use super::{AuthenticationError, Authenticator};
use async_trait::async_trait;
use std::{collections::HashMap, fmt};

/// [`Authenticator`] that accepts the username/password pairs it was given.
///
/// ```rust
/// use libftpkit::auth::UserList;
///
/// let users = UserList::new().user("alice", "secret").user("bob", "hunter2");
/// assert_eq!(users.len(), 2);
/// ```
#[derive(Default, Clone)]
pub struct UserList {
    users: HashMap<String, String>,
}

impl UserList {
    /// An empty list that rejects everyone
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, replacing an earlier password for the same name.
    pub fn user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// The number of known users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true when no users were added
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// Passwords stay out of logs.
impl fmt::Debug for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserList").field("users", &self.users.keys().collect::<Vec<_>>()).finish()
    }
}

#[async_trait]
impl Authenticator for UserList {
    #[tracing_attributes::instrument(skip(self, password))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthenticationError> {
        Ok(self.users.get(username).is_some_and(|known| known == password))
    }
}
