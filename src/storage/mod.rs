//! Contains the [`Storage`] trait the FTP server serves files from, and the [`Filesystem`]
//! back-end.
//!
//! The trait lives in the `ftpkit-core` crate so back-ends can be written without depending on
//! the whole server. It is re-exported here together with its entry and error types.

mod filesystem;

pub use filesystem::Filesystem;
pub use ftpkit_core::storage::*;
