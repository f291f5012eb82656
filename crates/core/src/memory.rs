//! Memory store trait: the persistent fact log behind the memory tools.
//!
//! The store is an append-only log of timestamped facts. It persists across
//! runs (unlike the transcript) and is read in full before every turn.

use async_trait::async_trait;
use crate::error::StorageError;

/// Returned by `read_all` when nothing has been stored yet.
pub const MEMORY_EMPTY: &str = "Memory is empty.";

/// The Memory Store trait.
///
/// Implementations: plain-text file (`FileMemory`), in-memory (tests).
/// A single process and a single writer are assumed; implementations do
/// not guard against other processes appending to the same backing file.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Durably append one fact. Returns a human-readable confirmation.
    async fn append(&self, content: &str) -> std::result::Result<String, StorageError>;

    /// The whole log with trailing whitespace trimmed, or [`MEMORY_EMPTY`]
    /// when nothing has been stored. A store that does not exist yet is empty,
    /// not an error.
    async fn read_all(&self) -> std::result::Result<String, StorageError>;
}
