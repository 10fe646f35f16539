//! Append-only record of what each compose request did
//!
//! Entries are written as `<ISO-8601 timestamp> - <message>`, one per line.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex as AsyncMutex};

/// Journal write failures
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to create journal directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to open journal {}: {source}", path.display())]
    Open { path: PathBuf, source: std::io::Error },

    #[error("failed to append to journal: {0}")]
    Write(#[from] std::io::Error),
}

/// A single journal line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    /// Stamp `message` with the current UTC time at millisecond precision
    ///
    /// Backslashes and line breaks inside the message are escaped so the
    /// entry stays on one line and reads back unambiguously.
    pub fn now(message: &str) -> Self {
        Self {
            timestamp: format!("{:.3}", jiff::Timestamp::now()),
            message: message
                .replace('\\', "\\\\")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp, self.message)
    }
}

/// Sink for journal entries
#[async_trait]
pub trait RequestLog: Send + Sync {
    /// Append one entry
    async fn append(&self, message: &str) -> Result<(), JournalError>;
}

/// Journal backed by a file opened in append mode
///
/// The parent directory is created and the file opened on the first append.
/// Appends are serialized so concurrent requests never interleave lines.
pub struct FileJournal {
    path: PathBuf,
    file: AsyncMutex<Option<fs::File>>,
}

impl FileJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: AsyncMutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<fs::File, JournalError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|source| JournalError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| JournalError::Open {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), "request journal opened");

        Ok(file)
    }
}

#[async_trait]
impl RequestLog for FileJournal {
    async fn append(&self, message: &str) -> Result<(), JournalError> {
        let line = format!("{}\n", LogEntry::now(message));

        let mut guard = self.file.lock().await;

        if guard.is_none() {
            *guard = Some(self.open().await?);
        }

        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        Ok(())
    }
}

/// In-memory journal, handy for tests and embedding
#[derive(Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in arrival order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Messages of all entries in arrival order
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.message).collect()
    }
}

#[async_trait]
impl RequestLog for MemoryJournal {
    async fn append(&self, message: &str) -> Result<(), JournalError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry::now(message));
        Ok(())
    }
}
