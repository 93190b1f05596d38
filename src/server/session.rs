use derive_more::Display;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    WaitPass,
    WaitCmd,
}

/// The representation type set with `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferType {
    #[display("ASCII")]
    Ascii,
    #[display("BINARY")]
    Image,
}

// This is where we keep the state for a ftp session.
#[derive(Debug)]
pub struct Session {
    // Identifies the session towards the storage back-end.
    pub id: String,
    pub username: Option<String>,
    pub state: SessionState,
    pub rename_from: Option<String>,
    // Opened by PASV, consumed by the next data transfer.
    pub passive: Option<TcpListener>,
    pub transfer_type: TransferType,
    pub quitting: bool,
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            username: None,
            state: SessionState::New,
            rename_from: None,
            passive: None,
            transfer_type: TransferType::Ascii,
            quitting: false,
        }
    }

    pub fn logged_in(&self) -> bool {
        self.state == SessionState::WaitCmd
    }

    // The user name for logs and interceptors.
    pub fn user(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_get_unique_ids() {
        let (a, b) = (Session::new(), Session::new());
        assert_ne!(a.id, b.id);
        assert!(!a.logged_in());
        assert_eq!(a.transfer_type, TransferType::Ascii);
    }
}
