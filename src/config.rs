//! Configuration for the server and the client.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! is a valid configuration. Command-line flags are applied on top by the
//! binaries.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//!   static_root: website
//!   workers: 32
//! client:
//!   keep_alive: true
//!   read_timeout_ms: 2000
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory that receives `access.log`.
    pub log_dir: PathBuf,
    /// Listen backlog: connections the kernel queues before they are accepted.
    pub max_connections: u32,
    /// Connections served concurrently.
    pub workers: usize,
    pub static_root: PathBuf,
    pub default_document: String,
    /// Upper bound on the bytes read for a single request.
    pub read_buffer_size: usize,
    pub read_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_dir: PathBuf::from("logs"),
            max_connections: 5,
            workers: 64,
            static_root: PathBuf::from("website"),
            default_document: "index.html".to_string(),
            read_buffer_size: 8192,
            read_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves `host:port` to a socket address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        use std::net::ToSocketAddrs;

        self.listen_addr()
            .to_socket_addrs()
            .with_context(|| format!("Invalid listen address {}", self.listen_addr()))?
            .next()
            .with_context(|| format!("No address found for {}", self.listen_addr()))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub keep_alive: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            keep_alive: false,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Loads configuration from a YAML file, or returns defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}
