//! Contains the [`Storage`] trait the FTP server talks to.
//!
//! Every operation is keyed by a client id (one per control connection) and a URI as sent by
//! the client. Relative URIs are resolved against the client's base collection, which is
//! what `CWD` changes. The [`resolve`] helper implements that resolution for back-ends.

mod entry;
mod error;
mod path;

pub use entry::{EntryType, Permissions, StorageEntry};
pub use error::{Error, ErrorKind};
pub use path::{parent, resolve};

use async_trait::async_trait;
use std::fmt::Debug;
use tokio::io::AsyncRead;

/// Result type used by storage back-ends
pub type Result<T> = std::result::Result<T, Error>;

/// A boxed byte source handed to or produced by a back-end.
pub type ByteStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// The `Storage` trait can be implemented to serve FTP clients from any kind of store.
#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// Changes the base collection of the client, returning the new normalized base. Fails when
    /// the target is not an existing collection.
    async fn set_base(&self, client: &str, uri: &str) -> Result<String>;

    /// The current base collection of the client, `/` when never set.
    fn base(&self, client: &str) -> String;

    /// Resolves a client URI to an absolute virtual path.
    fn realname(&self, client: &str, uri: &str) -> String {
        resolve(&self.base(client), uri)
    }

    /// Looks up an entry, `None` when nothing exists at that URI.
    async fn lookup(&self, client: &str, uri: &str) -> Result<Option<StorageEntry>>;

    /// Creates an empty element or collection.
    async fn create(&self, client: &str, uri: &str, entry_type: EntryType) -> Result<StorageEntry>;

    /// Lists the entries inside a collection.
    async fn elements(&self, client: &str, uri: &str) -> Result<Vec<StorageEntry>>;

    /// Opens an element for reading.
    async fn get(&self, client: &str, uri: &str) -> Result<ByteStream>;

    /// Replaces the content of an element with everything read from `input`, returning the
    /// number of bytes stored.
    async fn put(&self, client: &str, uri: &str, input: ByteStream) -> Result<u64>;

    /// Removes an element or an empty collection.
    async fn delete(&self, client: &str, uri: &str) -> Result<()>;

    /// Moves an entry.
    async fn rename(&self, client: &str, from: &str, to: &str) -> Result<()>;

    /// Changes the mode bits of an entry.
    async fn set_permissions(&self, client: &str, uri: &str, mode: u32) -> Result<()>;

    /// Releases per-client state once its session ends.
    fn forget(&self, _client: &str) {}
}
