//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::PageAnalysis;
use crate::storage::StoredRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// Implementations keep at most one live (non-tombstoned) record per URL.
/// Callers that share a store across tasks wrap it in `Arc<Mutex<_>>`.
pub trait Storage {
    /// Inserts or refreshes the live record for `url`
    ///
    /// Tombstoned rows for the same URL are purged first so they never shadow
    /// the fresh row. An existing live row keeps its id and `created_at`;
    /// every analysis field plus `crawled_at` is overwritten.
    ///
    /// # Arguments
    ///
    /// * `url` - The natural key of the record
    /// * `analysis` - The analysis to store
    ///
    /// # Returns
    ///
    /// The live record after the write
    fn upsert(&mut self, url: &str, analysis: &PageAnalysis) -> StorageResult<StoredRecord>;

    /// Lists all live records in id order
    fn list_all(&self) -> StorageResult<Vec<StoredRecord>>;

    /// Gets a live record by id
    ///
    /// Returns `StorageError::RecordNotFound` on a miss
    fn get_by_id(&self, id: i64) -> StorageResult<StoredRecord>;

    /// Gets the live record for a URL, if any
    fn get_by_url(&self, url: &str) -> StorageResult<Option<StoredRecord>>;

    /// Tombstones live records, returning how many were marked
    fn soft_delete(&mut self, ids: &[i64]) -> StorageResult<usize>;

    /// Physically removes records regardless of tombstone state
    ///
    /// Unknown ids are ignored; the count covers only rows actually removed.
    fn bulk_hard_delete(&mut self, ids: &[i64]) -> StorageResult<usize>;
}
