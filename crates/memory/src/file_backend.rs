//! File-based memory store: an append-only plain-text log.
//!
//! One fact per line, each prefixed with a bracketed local timestamp:
//!
//! ```text
//! [2025-06-04 18:22:10] User name: Jonas
//! [2025-06-04 18:23:41] Favourite food: cepelinai
//! ```
//!
//! Lines are never rewritten or reordered. The file is created on the first
//! append; until then the store reads as empty. Only one writer is
//! supported: another process appending to the same file at the same time
//! can interleave partial lines.

use async_trait::async_trait;
use chrono::Local;
use mnemo_core::error::StorageError;
use mnemo_core::memory::{MEMORY_EMPTY, MemoryStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{format_record, saved};

/// A file-backed, append-only memory log.
pub struct FileMemory {
    path: PathBuf,
}

impl FileMemory {
    /// Create a store at `path`. Nothing is touched on disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(path = %path.display(), "File memory store configured");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl MemoryStore for FileMemory {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, content: &str) -> Result<String, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut line = format_record(&Local::now(), content);
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bytes = line.len(), "Appended memory record");
        Ok(saved(content))
    }

    async fn read_all(&self) -> Result<String, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MEMORY_EMPTY.to_string()),
            Err(e) => return Err(self.io_error(e)),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            Ok(MEMORY_EMPTY.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}
