//! Mapping of request paths onto files below the static root.

use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::ServerConfig;
use crate::http::mime;
use crate::http::response::StatusCode;

pub const NOT_FOUND_BODY: &[u8] = b"404 Not Found";
pub const INTERNAL_ERROR_BODY: &[u8] = b"Internal Server Error";

/// Outcome of serving one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileServeResult {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl FileServeResult {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::Ok,
            content_type: Some(content_type),
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NotFound,
            content_type: None,
            body: NOT_FOUND_BODY.to_vec(),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::InternalServerError,
            content_type: None,
            body: INTERNAL_ERROR_BODY.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaticFileResolver {
    root: PathBuf,
    default_document: String,
}

impl StaticFileResolver {
    pub fn new(root: impl Into<PathBuf>, default_document: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            default_document: default_document.into(),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(cfg.static_root.clone(), cfg.default_document.clone())
    }

    /// Strips the query, percent-decodes, drops leading slashes and removes
    /// every `..` substring.
    ///
    /// This is a coarse guard. [`file_path`](Self::file_path) additionally
    /// keeps only normal path components when joining onto the root.
    ///
    /// ```
    /// # use beacon::server::static_files::StaticFileResolver;
    /// assert_eq!(StaticFileResolver::sanitize("/css/site.css"), "css/site.css");
    /// assert_eq!(StaticFileResolver::sanitize("/../../etc/passwd"), "//etc/passwd");
    /// assert_eq!(StaticFileResolver::sanitize("/a%20b.txt?v=2"), "a b.txt");
    /// ```
    pub fn sanitize(request_path: &str) -> String {
        let path = request_path.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        decoded.trim_start_matches('/').replace("..", "")
    }

    /// The file a request path maps to.
    ///
    /// Only `/` or a path that sanitizes to nothing maps to the default
    /// document. A path like `/./` keeps no normal components and maps to the
    /// root directory itself, which is served as 404.
    pub fn file_path(&self, request_path: &str) -> PathBuf {
        let sanitized = Self::sanitize(request_path);
        let relative: PathBuf = Path::new(&sanitized)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();

        if request_path == "/" || sanitized.is_empty() {
            self.root.join(&self.default_document)
        } else {
            self.root.join(relative)
        }
    }

    /// Serves a request path: 200 with the file contents, 404 when there is
    /// no such file, 500 on any other I/O failure.
    pub async fn resolve(&self, request_path: &str) -> FileServeResult {
        let path = self.file_path(request_path);

        match Self::read_file(&path).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read static file"
                );
                FileServeResult::internal_error()
            }
        }
    }

    async fn read_file(path: &Path) -> io::Result<FileServeResult> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if is_missing(&e) => return Ok(FileServeResult::not_found()),
            Err(e) => return Err(e),
        };

        if metadata.is_dir() {
            return Ok(FileServeResult::not_found());
        }

        match tokio::fs::read(path).await {
            Ok(body) => Ok(FileServeResult::ok(mime::for_path(path), body)),
            Err(e) if is_missing(&e) => Ok(FileServeResult::not_found()),
            Err(e) => Err(e),
        }
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
