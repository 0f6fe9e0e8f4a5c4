use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::server::access_log::AccessLog;
use crate::server::dispatcher::Dispatcher;

/// Accept loop handing each connection to its own task.
///
/// At most `workers` connections are served at once. When every worker is
/// busy the loop stops accepting, leaving new connections in the listen
/// backlog (`max_connections`).
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    workers: Arc<Semaphore>,
}

impl Server {
    /// Binds the listening socket. Must be called inside a tokio runtime.
    pub fn bind(cfg: &ServerConfig, access_log: Arc<dyn AccessLog>) -> anyhow::Result<Self> {
        let addr = cfg.socket_addr()?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("Failed to bind {}", addr))?;
        let listener = socket.listen(cfg.max_connections.max(1))?;

        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::from_config(cfg, access_log)),
            workers: Arc::new(Semaphore::new(cfg.workers.max(1))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            let permit = self
                .workers
                .clone()
                .acquire_owned()
                .await
                .context("Worker pool closed")?;

            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            };
            info!("Accepted connection from {}", peer);

            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.handle(socket, peer).await;
                drop(permit);
            });
        }
    }
}
