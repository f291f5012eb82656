//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Local;
use mnemo_core::error::StorageError;
use mnemo_core::memory::{MEMORY_EMPTY, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{format_record, saved};

/// A memory store that keeps formatted lines in a Vec.
/// Same line format and sentinels as the file store, nothing persisted.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    lines: Arc<RwLock<Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored facts.
    pub async fn len(&self) -> usize {
        self.lines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, content: &str) -> Result<String, StorageError> {
        self.lines
            .write()
            .await
            .push(format_record(&Local::now(), content));
        Ok(saved(content))
    }

    async fn read_all(&self) -> Result<String, StorageError> {
        let lines = self.lines.read().await;
        let joined = lines.join("\n");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            Ok(MEMORY_EMPTY.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let mem = InMemoryStore::new();
        assert!(mem.is_empty().await);
        assert_eq!(mem.read_all().await.unwrap(), MEMORY_EMPTY);
    }

    #[tokio::test]
    async fn append_then_read() {
        let mem = InMemoryStore::new();
        mem.append("first").await.unwrap();
        mem.append("second").await.unwrap();
        let log = mem.read_all().await.unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.lines().next().unwrap().ends_with("] first"));
        assert!(log.ends_with("] second"));
        assert_eq!(mem.len().await, 2);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mem = InMemoryStore::new();
        let handle = mem.clone();
        handle.append("shared").await.unwrap();
        assert_eq!(mem.len().await, 1);
    }
}
