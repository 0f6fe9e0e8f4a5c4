use crate::http::HTTP_VERSION;

/// Value of the `Server` header on every response.
pub const SERVER_ID: &str = "Beacon/0.1";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): File found and served
/// - `NotFound` (404): No such file, or the path names a directory
/// - `InternalServerError` (500): Unexpected failure while serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use beacon::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }

    /// Returns the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Reason phrase for an arbitrary numeric code.
///
/// Codes outside the fixed table get an empty phrase rather than an error.
///
/// ```
/// # use beacon::http::response::reason_phrase;
/// assert_eq!(reason_phrase(404), "Not Found");
/// assert_eq!(reason_phrase(418), "");
/// ```
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .map(|status| status.reason_phrase())
        .unwrap_or("")
}

/// Frames a response header block. The caller appends the body.
///
/// The server never offers persistent connections, so `Connection: close`
/// is always emitted. `Content-Type` appears only when supplied.
pub fn build_response(status_code: u16, content_type: Option<&str>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status_code,
        reason_phrase(status_code)
    );
    buf.extend_from_slice(status_line.as_bytes());

    buf.extend_from_slice(format!("Server: {}\r\n", SERVER_ID).as_bytes());
    buf.extend_from_slice(b"Connection: close\r\n");

    if let Some(content_type) = content_type {
        buf.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}
