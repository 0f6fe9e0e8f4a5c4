//! Content-type lookup by file extension.

use std::path::Path;

/// Content type served for files whose extension is not in the table.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns the MIME type for a file extension (without the leading dot).
///
/// Matching is ASCII case-insensitive. Unknown extensions yield `None`.
///
/// # Example
///
/// ```
/// # use beacon::http::mime::for_extension;
/// assert_eq!(for_extension("html"), Some("text/html"));
/// assert_eq!(for_extension("CSS"), Some("text/css"));
/// assert_eq!(for_extension("exe"), None);
/// ```
pub fn for_extension(ext: &str) -> Option<&'static str> {
    let content_type = match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}

/// Returns the MIME type for a path, falling back to [`DEFAULT_CONTENT_TYPE`].
pub fn for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(for_extension)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
