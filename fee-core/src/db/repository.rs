use async_trait::async_trait;
use thiserror::Error;

use crate::models::{HistoryEntry, NewHistoryEntry};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Durable storage for calculation history and the free-save counter.
///
/// The store exclusively owns the ordered history collection; the
/// calculation engine never reads it. The counter follows a
/// load-at-start / save-on-change lifecycle, and callers treat a failed
/// counter read as zero rather than fatal.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Persists a new snapshot, assigning its id and timestamp.
    async fn add_entry(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, RepositoryError>;

    /// All saved entries, newest first.
    async fn list_entries(&self) -> Result<Vec<HistoryEntry>, RepositoryError>;

    /// Removes the selected entries; returns how many were deleted.
    async fn delete_entries(&self, ids: &[i64]) -> Result<u64, RepositoryError>;

    /// Removes every entry; returns how many were deleted.
    async fn clear_entries(&self) -> Result<u64, RepositoryError>;

    /// The persisted free-save counter; 0 when never written.
    async fn load_save_count(&self) -> Result<u32, RepositoryError>;

    /// Writes the free-save counter. Called after every quota mutation.
    async fn store_save_count(&self, count: u32) -> Result<(), RepositoryError>;
}
