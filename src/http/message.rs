use crate::http::headers::Headers;

/// First line of an HTTP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    /// `<method> <path> <version>`
    Request {
        method: String,
        path: String,
        version: String,
    },
    /// `<version> <code> <reason>`; the reason may contain spaces or be empty.
    Status {
        version: String,
        code: u16,
        reason: String,
    },
}

/// A request or response decoded from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub start_line: StartLine,
    pub headers: Headers,
    /// Every byte that followed the `\r\n\r\n` delimiter.
    pub body: Vec<u8>,
}

impl ParsedMessage {
    /// Request method, or `None` for a response.
    pub fn method(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Request { method, .. } => Some(method),
            StartLine::Status { .. } => None,
        }
    }

    /// Request path, or `None` for a response.
    pub fn path(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Request { path, .. } => Some(path),
            StartLine::Status { .. } => None,
        }
    }

    /// Response status code, or `None` for a request.
    pub fn status_code(&self) -> Option<u16> {
        match &self.start_line {
            StartLine::Status { code, .. } => Some(*code),
            StartLine::Request { .. } => None,
        }
    }

    /// Response reason phrase, or `None` for a request.
    pub fn reason(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Status { reason, .. } => Some(reason),
            StartLine::Request { .. } => None,
        }
    }

    pub fn version(&self) -> &str {
        match &self.start_line {
            StartLine::Request { version, .. } | StartLine::Status { version, .. } => version,
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}
