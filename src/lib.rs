//! Beacon - raw HTTP/1.1 static file server and GET client
//!
//! Core library for message framing, the client connection manager and the
//! static file server.

pub mod client;
pub mod config;
pub mod http;
pub mod server;
