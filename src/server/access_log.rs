//! Append-only request log.
//!
//! The sink is passed explicitly to the dispatcher instead of living in a
//! global, so independent server instances (and tests) never share state.

use anyhow::Context;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const ACCESS_LOG_FILE: &str = "access.log";

/// One served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub client: IpAddr,
    pub timestamp: DateTime<Local>,
    pub method: String,
    pub path: String,
    pub status: u16,
    /// Body bytes sent, excluding the header block.
    pub content_length: usize,
}

impl AccessLogEntry {
    pub fn new(
        client: IpAddr,
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        content_length: usize,
    ) -> Self {
        Self {
            client,
            timestamp: Local::now(),
            method: method.into(),
            path: path.into(),
            status,
            content_length,
        }
    }
}

/// Common log format: `ip - - [timestamp] "METHOD path HTTP/1.1" status bytes`
impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} HTTP/1.1\" {} {}",
            self.client,
            self.timestamp.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status,
            self.content_length
        )
    }
}

/// Destination for access-log entries. Must tolerate concurrent writers.
pub trait AccessLog: Send + Sync {
    fn append(&self, entry: &AccessLogEntry) -> anyhow::Result<()>;
}

/// Appends one line per entry to `<log_dir>/access.log`.
#[derive(Debug)]
pub struct FileAccessLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAccessLog {
    /// Opens (creating if needed) the log file inside `log_dir`.
    pub fn open(log_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let path = log_dir.join(ACCESS_LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open access log {}", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccessLog for FileAccessLog {
    fn append(&self, entry: &AccessLogEntry) -> anyhow::Result<()> {
        let line = format!("{}\n", entry);
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("access log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAccessLog {
    entries: Mutex<Vec<AccessLogEntry>>,
}

impl MemoryAccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AccessLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AccessLog for MemoryAccessLog {
    fn append(&self, entry: &AccessLogEntry) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("access log lock poisoned"))?
            .push(entry.clone());
        Ok(())
    }
}
