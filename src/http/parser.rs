//! Decoding of raw byte buffers into [`ParsedMessage`]s.
//!
//! Both requests and responses share the same framing: a UTF-8 header block
//! terminated by `\r\n\r\n`, followed by the body. Only the start line differs.

use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::message::{ParsedMessage, StartLine};

/// Delimiter between the header block and the body.
pub const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("no header/body delimiter in {0} bytes")]
    MissingDelimiter(usize),
    #[error("malformed start line: {0:?}")]
    MalformedStartLine(String),
    #[error("header block is not valid UTF-8")]
    InvalidEncoding,
}

/// Offset of the first `\r\n\r\n` in `buf`.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_DELIMITER.len())
        .position(|w| w == HEADER_DELIMITER)
}

/// Parses a response: `HTTP/1.1 <code> <reason>` followed by headers and body.
pub fn parse_response(buf: &[u8]) -> Result<ParsedMessage, FramingError> {
    parse_with(buf, parse_status_line)
}

/// Parses a request: `<method> <path> <version>` followed by headers and body.
pub fn parse_request(buf: &[u8]) -> Result<ParsedMessage, FramingError> {
    parse_with(buf, parse_request_line)
}

/// Whether `buf` holds a complete message.
///
/// False until the header delimiter has arrived. After that, a message with a
/// valid `Content-Length` is complete once the whole body is buffered. A
/// message without one is complete as soon as the headers are: the framing
/// layer cannot tell a close-delimited body from an empty one.
///
/// A `Content-Length` so large that the total size overflows `usize` can
/// never be satisfied, so such a message is never complete.
pub fn is_complete(buf: &[u8]) -> bool {
    let Some(headers_end) = find_headers_end(buf) else {
        return false;
    };

    let header_block = String::from_utf8_lossy(&buf[..headers_end]);
    let headers = parse_header_lines(header_block.split("\r\n").skip(1));

    match headers.content_length() {
        Some(len) => headers_end
            .checked_add(HEADER_DELIMITER.len())
            .and_then(|body_start| body_start.checked_add(len))
            .is_some_and(|needed| buf.len() >= needed),
        None => true,
    }
}

fn parse_with(
    buf: &[u8],
    start_line: fn(&str) -> Result<StartLine, FramingError>,
) -> Result<ParsedMessage, FramingError> {
    let headers_end = find_headers_end(buf).ok_or(FramingError::MissingDelimiter(buf.len()))?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + HEADER_DELIMITER.len()..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| FramingError::InvalidEncoding)?;

    let mut lines = headers_str.split("\r\n");
    let first = lines.next().unwrap_or_default();

    Ok(ParsedMessage {
        start_line: start_line(first)?,
        headers: parse_header_lines(lines),
        body: body_bytes.to_vec(),
    })
}

fn parse_status_line(line: &str) -> Result<StartLine, FramingError> {
    let malformed = || FramingError::MalformedStartLine(line.to_string());

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().filter(|v| !v.is_empty()).ok_or_else(malformed)?;
    let code = parts
        .next()
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or_default();

    Ok(StartLine::Status {
        version: version.to_string(),
        code,
        reason: reason.to_string(),
    })
}

fn parse_request_line(line: &str) -> Result<StartLine, FramingError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let [method, path, version] = parts.as_slice() else {
        return Err(FramingError::MalformedStartLine(line.to_string()));
    };

    Ok(StartLine::Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    })
}

/// Lines without a `": "` separator are skipped.
fn parse_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Headers {
    let mut headers = Headers::new();

    for line in lines {
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key, value);
        }
    }

    headers
}
