//! Single-socket connection management for the client.
//!
//! ```text
//!   Disconnected ──ensure_connected──▶ Connected ──finish_exchange──▶ Reusable
//!        ▲                                 │                            │
//!        │   close / timeout / EOF /       │                            │
//!        └──── Connection: close ──────────┘◀──────ensure_connected─────┘
//! ```

use bytes::BytesMut;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::http::message::ParsedMessage;
use crate::http::parser::{is_complete, parse_response};

/// Default buffer size for reading responses
const BUFFER_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket. The next request opens a new one.
    Disconnected,
    /// Socket open, exchange in progress.
    Connected,
    /// Socket open and kept alive for the next request.
    Reusable,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out connecting to {addr}")]
    ConnectTimeout { addr: String },
    #[error("not connected")]
    NotConnected,
    #[error("connection closed before a response arrived")]
    ClosedBeforeResponse,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConnectionError {
    /// Whether the error is what a kept-alive socket the server has since
    /// closed looks like.
    pub fn is_stale_connection(&self) -> bool {
        match self {
            ConnectionError::ClosedBeforeResponse => true,
            ConnectionError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

/// How a response read ended.
enum ReadEnd {
    Complete,
    PeerClosed,
    TimedOut,
}

/// Owns at most one socket to a fixed server address.
#[derive(Debug)]
pub struct ConnectionManager {
    addr: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    keep_alive: bool,
    stream: Option<TcpStream>,
    state: ConnectionState,
}

impl ConnectionManager {
    /// `addr` is `host:port`. No socket is opened until the first request.
    pub fn new(addr: impl Into<String>, cfg: &ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: cfg.connect_timeout(),
            read_timeout: cfg.read_timeout(),
            keep_alive: cfg.keep_alive,
            stream: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Opens a socket when disconnected; reuses the open one otherwise.
    pub async fn ensure_connected(&mut self) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Disconnected && self.stream.is_some() {
            self.state = ConnectionState::Connected;
            return Ok(());
        }

        let stream = timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ConnectionError::ConnectTimeout {
                addr: self.addr.clone(),
            })?
            .map_err(|source| ConnectionError::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        debug!(addr = %self.addr, "Connected");
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Writes `request` and reads back the raw response.
    ///
    /// Reading stops once the buffered bytes form a complete message, the
    /// peer closes, or the read timeout elapses. A timed-out read returns
    /// whatever arrived, which may be an incomplete message. A response that
    /// has no `Content-Length` but announces `Connection: close` is read
    /// until the peer closes.
    pub async fn send_and_receive(&mut self, request: &[u8]) -> Result<Vec<u8>, ConnectionError> {
        let stream = self.stream.as_mut().ok_or(ConnectionError::NotConnected)?;

        let outcome = exchange(stream, request, self.read_timeout).await;

        match outcome {
            Ok((buffer, ReadEnd::Complete)) => Ok(buffer.to_vec()),
            Ok((buffer, ReadEnd::PeerClosed)) => {
                self.disconnect();
                if buffer.is_empty() {
                    return Err(ConnectionError::ClosedBeforeResponse);
                }
                Ok(buffer.to_vec())
            }
            Ok((buffer, ReadEnd::TimedOut)) => {
                warn!(
                    addr = %self.addr,
                    received = buffer.len(),
                    "Read timed out, response may be incomplete"
                );
                self.disconnect();
                Ok(buffer.to_vec())
            }
            Err(e) => {
                self.disconnect();
                Err(e.into())
            }
        }
    }

    /// Decides whether the socket survives the exchange that produced
    /// `response`.
    pub fn finish_exchange(&mut self, response: &ParsedMessage) {
        if self.state == ConnectionState::Disconnected {
            return;
        }

        if !self.keep_alive || response.headers.wants_close() {
            debug!(addr = %self.addr, keep_alive = self.keep_alive, "Closing connection");
            self.disconnect();
        } else {
            self.state = ConnectionState::Reusable;
        }
    }

    /// Drops the socket without a graceful shutdown.
    pub fn disconnect(&mut self) {
        self.stream = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Shuts the socket down and drops it.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(addr = %self.addr, error = %e, "Shutdown failed");
            }
        }
        self.state = ConnectionState::Disconnected;
    }
}

async fn exchange(
    stream: &mut TcpStream,
    request: &[u8],
    read_timeout: Duration,
) -> io::Result<(BytesMut, ReadEnd)> {
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let mut until_close = false;

    loop {
        let n = match timeout(read_timeout, stream.read_buf(&mut buffer)).await {
            Ok(read) => read?,
            Err(_) => return Ok((buffer, ReadEnd::TimedOut)),
        };

        if n == 0 {
            return Ok((buffer, ReadEnd::PeerClosed));
        }

        if !until_close && is_complete(&buffer) {
            if is_close_delimited(&buffer) {
                until_close = true;
            } else {
                return Ok((buffer, ReadEnd::Complete));
            }
        }
    }
}

/// A message whose body runs until the peer closes: no `Content-Length`,
/// and `Connection: close` announced.
fn is_close_delimited(buf: &[u8]) -> bool {
    parse_response(buf)
        .map(|response| {
            response.headers.content_length().is_none() && response.headers.wants_close()
        })
        .unwrap_or(false)
}
