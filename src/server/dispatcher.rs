use anyhow::Context;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::http::parser::{is_complete, parse_request};
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;
use crate::server::access_log::{AccessLog, AccessLogEntry};
use crate::server::static_files::{FileServeResult, StaticFileResolver};

const READ_CHUNK: usize = 4096;

/// Serves exactly one request per connection, then closes it.
pub struct Dispatcher {
    resolver: StaticFileResolver,
    access_log: Arc<dyn AccessLog>,
    read_buffer_size: usize,
    read_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        resolver: StaticFileResolver,
        access_log: Arc<dyn AccessLog>,
        read_buffer_size: usize,
        read_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            access_log,
            read_buffer_size: read_buffer_size.max(1),
            read_timeout,
        }
    }

    pub fn from_config(cfg: &ServerConfig, access_log: Arc<dyn AccessLog>) -> Self {
        Self::new(
            StaticFileResolver::from_config(cfg),
            access_log,
            cfg.read_buffer_size,
            cfg.read_timeout(),
        )
    }

    /// Reads, resolves and answers one request. The stream is always shut
    /// down before returning, whatever happened before.
    pub async fn handle<S>(&self, mut stream: S, peer: SocketAddr)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Err(e) = self.serve(&mut stream, peer).await {
            warn!(peer = %peer, error = %format!("{:#}", e), "Connection error");
        }

        if let Err(e) = stream.shutdown().await {
            debug!(peer = %peer, error = %e, "Shutdown failed");
        }
        debug!(peer = %peer, "Connection closed");
    }

    async fn serve<S>(&self, stream: &mut S, peer: SocketAddr) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let buffer = self
            .read_request(stream)
            .await
            .context("Failed to read request")?;

        if buffer.is_empty() {
            debug!(peer = %peer, "Client closed without sending a request");
            return Ok(());
        }

        let (method, path, result) = match parse_request(&buffer) {
            Ok(request) => {
                let method = request.method().unwrap_or_default().to_string();
                let path = request.path().unwrap_or_default().to_string();
                debug!(peer = %peer, method = %method, path = %path, "Request received");

                let result = self.resolver.resolve(&path).await;
                (method, path, result)
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "Malformed request");
                ("-".to_string(), "-".to_string(), FileServeResult::internal_error())
            }
        };

        let status = result.status.as_u16();
        let mut writer = ResponseWriter::new(status, result.content_type, &result.body);
        writer
            .write_to_stream(stream)
            .await
            .context("Failed to write response")?;

        let entry = AccessLogEntry::new(peer.ip(), &method, &path, status, writer.body_len());
        if let Err(e) = self.access_log.append(&entry) {
            warn!(error = %e, "Failed to append access log entry");
        }

        if result.status == StatusCode::InternalServerError {
            warn!(peer = %peer, method = %method, path = %path, status, "Request failed");
        } else {
            info!(
                peer = %peer,
                method = %method,
                path = %path,
                status,
                bytes = writer.body_len(),
                "Request served"
            );
        }

        Ok(())
    }

    /// Reads until a complete request is buffered, the peer stops sending,
    /// the size limit is hit or the read timeout elapses.
    async fn read_request<S>(&self, stream: &mut S) -> std::io::Result<BytesMut>
    where
        S: AsyncRead + Unpin,
    {
        let mut buffer = BytesMut::with_capacity(self.read_buffer_size.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];

        while buffer.len() < self.read_buffer_size {
            let want = (self.read_buffer_size - buffer.len()).min(READ_CHUNK);

            let n = match timeout(self.read_timeout, stream.read(&mut chunk[..want])).await {
                Ok(read) => read?,
                Err(_) => {
                    debug!(buffered = buffer.len(), "Request read timed out");
                    break;
                }
            };

            if n == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..n]);

            if is_complete(&buffer) {
                break;
            }
        }

        Ok(buffer)
    }
}
