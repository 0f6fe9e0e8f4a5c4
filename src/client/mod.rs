//! Blocking-style GET client over a single, optionally kept-alive connection.

pub mod connection;

use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;
use crate::http::message::ParsedMessage;
use crate::http::parser::{FramingError, parse_response};
use crate::http::request::{ConnectionMode, Method, build_request};

pub use connection::{ConnectionError, ConnectionManager, ConnectionState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("invalid response: {0}")]
    Framing(#[from] FramingError),
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Where a request goes: parsed from an `http://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    /// Path plus query, e.g. `/search?q=rust`. Never empty.
    pub path: String,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let invalid = |reason: &str| ClientError::InvalidUrl {
            url: input.to_string(),
            reason: reason.to_string(),
        };

        let url = url::Url::parse(input).map_err(|e| invalid(&e.to_string()))?;

        if url.scheme() != "http" {
            return Err(invalid("only http:// URLs are supported"));
        }

        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url.port_or_known_default().unwrap_or(80);

        let mut path = url.path().to_string();
        if path.is_empty() {
            path.push('/');
        }
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path,
        })
    }

    /// `host:port` to connect to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Value of the `Host` header: the port is omitted when it is 80.
    pub fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            self.addr()
        }
    }
}

/// Issues GET requests to one server.
pub struct Client {
    host_header: String,
    connection: ConnectionManager,
}

impl Client {
    pub fn new(target: &Target, cfg: &ClientConfig) -> Self {
        Self {
            host_header: target.host_header(),
            connection: ConnectionManager::new(target.addr(), cfg),
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Fetches `path` and returns the parsed response.
    ///
    /// When a kept-alive connection turns out to have been closed by the
    /// server, the request is sent once more over a fresh connection.
    pub async fn get(&mut self, path: &str) -> Result<ParsedMessage, ClientError> {
        let mode = ConnectionMode::from_keep_alive(self.connection.keep_alive());
        let request = build_request(Method::GET, path, &self.host_header, mode);

        let reused = self.connection.state() == ConnectionState::Reusable;
        self.connection.ensure_connected().await?;

        let raw = match self.connection.send_and_receive(&request).await {
            Ok(raw) => raw,
            Err(e) if reused && e.is_stale_connection() => {
                debug!(error = %e, "Kept-alive connection was closed by the server, reconnecting");
                self.connection.ensure_connected().await?;
                self.connection.send_and_receive(&request).await?
            }
            Err(e) => return Err(e.into()),
        };

        match parse_response(&raw) {
            Ok(response) => {
                self.connection.finish_exchange(&response);
                Ok(response)
            }
            Err(e) => {
                self.connection.disconnect();
                Err(e.into())
            }
        }
    }

    /// Closes the connection, if one is open.
    pub async fn close(&mut self) {
        self.connection.close().await;
    }
}
