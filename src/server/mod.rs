//! Contains the [`Server`] struct that is used to configure and run an FTP server instance.
//!
//! Each control connection is served by its own tokio task. Commands are looked up in a
//! dispatch table and run against the configured [`Storage`](crate::storage::Storage)
//! back-end, with [`Interceptor`]s getting a chance to veto operations first.

mod controlchan;
mod datachan;
mod error;
mod ftpserver;
mod interceptor;
mod session;

pub use error::ServerError;
pub use ftpserver::{DEFAULT_DATA_CONNECTION_TIMEOUT_SECS, DEFAULT_GREETING, DEFAULT_IDLE_SESSION_TIMEOUT_SECS, Server};
pub use interceptor::{EntrynameInterceptor, Interceptor, InterceptorCondition, Operation, PathCondition, Verdict};
