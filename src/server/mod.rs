//! Static file server.
//!
//! Every connection carries exactly one request: the dispatcher reads it,
//! resolves the path below the static root, writes the response with
//! `Connection: close` and closes the socket.

pub mod access_log;
pub mod dispatcher;
pub mod listener;
pub mod static_files;

pub use access_log::{AccessLog, AccessLogEntry, FileAccessLog, MemoryAccessLog};
pub use dispatcher::Dispatcher;
pub use listener::Server;
pub use static_files::{FileServeResult, StaticFileResolver};
