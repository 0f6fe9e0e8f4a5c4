use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt;

use crate::http::HTTP_VERSION;

/// Characters percent-encoded in the path component of a request target.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters percent-encoded in the query component of a request target.
const QUERY: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>');

/// Request methods the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `Connection` header sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    KeepAlive,
    Close,
}

impl ConnectionMode {
    pub fn from_keep_alive(keep_alive: bool) -> Self {
        if keep_alive {
            ConnectionMode::KeepAlive
        } else {
            ConnectionMode::Close
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionMode::KeepAlive => "keep-alive",
            ConnectionMode::Close => "close",
        }
    }
}

/// Normalizes a request target: percent-encodes the path (and query, if any)
/// and guarantees a leading `/`.
///
/// Existing `%XX` escapes are left untouched.
///
/// ```
/// # use beacon::http::request::normalize_target;
/// assert_eq!(normalize_target(""), "/");
/// assert_eq!(normalize_target("docs/my file.html"), "/docs/my%20file.html");
/// assert_eq!(normalize_target("/search?q=a b"), "/search?q=a%20b");
/// ```
pub fn normalize_target(target: &str) -> String {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let mut normalized = String::with_capacity(target.len() + 1);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.extend(utf8_percent_encode(path, PATH));

    if let Some(query) = query {
        normalized.push('?');
        normalized.extend(utf8_percent_encode(query, QUERY));
    }

    normalized
}

/// Frames a body-less request: request line, `Host`, `Connection`, blank line.
///
/// # Example
///
/// ```
/// # use beacon::http::request::{build_request, ConnectionMode, Method};
/// let bytes = build_request(Method::GET, "/index.html", "localhost", ConnectionMode::Close);
/// assert_eq!(
///     bytes,
///     b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_vec()
/// );
/// ```
pub fn build_request(method: Method, path: &str, host: &str, mode: ConnectionMode) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(64 + path.len() + host.len());

    buffer.extend_from_slice(
        format!("{} {} {}\r\n", method, normalize_target(path), HTTP_VERSION).as_bytes(),
    );
    buffer.extend_from_slice(format!("Host: {}\r\n", host).as_bytes());
    buffer.extend_from_slice(format!("Connection: {}\r\n", mode.as_str()).as_bytes());

    // End of headers
    buffer.extend_from_slice(b"\r\n");

    buffer
}
