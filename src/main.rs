use anyhow::Context;
use beacon::config::Config;
use beacon::server::{FileAccessLog, Server};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Static file server speaking raw HTTP/1.1
#[derive(Debug, Parser)]
#[command(name = "beacon", version)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "BEACON_CONFIG")]
    config: Option<PathBuf>,

    /// Host/IP to listen on
    #[arg(long, env = "BEACON_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "BEACON_PORT")]
    port: Option<u16>,

    /// Directory for access.log
    #[arg(long = "log-dir", env = "BEACON_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Listen backlog
    #[arg(long = "max-connections", env = "BEACON_MAX_CONNECTIONS")]
    max_connections: Option<u32>,

    /// Connections served concurrently
    #[arg(long, env = "BEACON_WORKERS")]
    workers: Option<usize>,

    /// Directory served as the site root
    #[arg(long, env = "BEACON_ROOT")]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?.server;

    if let Some(host) = args.host {
        cfg.host = host;
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(log_dir) = args.log_dir {
        cfg.log_dir = log_dir;
    }
    if let Some(max_connections) = args.max_connections {
        cfg.max_connections = max_connections;
    }
    if let Some(workers) = args.workers {
        cfg.workers = workers;
    }
    if let Some(root) = args.root {
        cfg.static_root = root;
    }

    let access_log = FileAccessLog::open(&cfg.log_dir)?;
    tracing::info!(
        root = %cfg.static_root.display(),
        access_log = %access_log.path().display(),
        "Serving static files"
    );

    let server = Server::bind(&cfg, Arc::new(access_log))
        .with_context(|| format!("Failed to start server on {}", cfg.listen_addr()))?;

    tokio::select! {
        res = server.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
