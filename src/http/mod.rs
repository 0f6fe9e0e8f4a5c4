//! HTTP/1.1 message framing over raw byte streams.
//!
//! Nothing here touches a socket except [`writer`]; everything else works on
//! byte buffers so the client and the server share one implementation.
//!
//! - **`headers`**: header map with lowercase key normalization
//! - **`message`**: [`ParsedMessage`](message::ParsedMessage) and its start line
//! - **`parser`**: splits a buffer into start line, headers and body; detects completion
//! - **`request`**: frames request lines (client side)
//! - **`response`**: frames status lines and response headers (server side)
//! - **`writer`**: writes a framed response to an async stream
//! - **`mime`**: content type detection based on file extensions
//!
//! # Wire format
//!
//! ```text
//! GET <path> HTTP/1.1\r\n
//! Host: <host>\r\n
//! Connection: keep-alive | close\r\n
//! \r\n
//!
//! HTTP/1.1 <code> <reason>\r\n
//! Server: Beacon/0.1\r\n
//! Connection: close\r\n
//! [Content-Type: <type>\r\n]
//! \r\n
//! <body>
//! ```
//!
//! # Example
//!
//! ```
//! use beacon::http::parser::{is_complete, parse_response};
//! use beacon::http::response::build_response;
//!
//! let mut bytes = build_response(200, Some("text/plain"));
//! bytes.extend_from_slice(b"hello");
//!
//! assert!(is_complete(&bytes));
//! let parsed = parse_response(&bytes).unwrap();
//! assert_eq!(parsed.status_code(), Some(200));
//! assert_eq!(parsed.body, b"hello");
//! ```

pub mod headers;
pub mod message;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub const HTTP_VERSION: &str = "HTTP/1.1";
