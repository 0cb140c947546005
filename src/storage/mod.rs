//! Storage module for persisting page analyses
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Upserting one live record per URL, purging stale tombstones first
//! - Point lookups, history listing and bulk deletion by id

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::PageAnalysis;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A persisted analysis, one live row per URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    /// Store-assigned identifier, stable across upserts of the same URL
    pub id: i64,

    #[serde(flatten)]
    pub analysis: PageAnalysis,

    /// When the analysis behind this version of the row ran
    pub crawled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Tombstone; a set value means the row is logically deleted
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    pub fn url(&self) -> &str {
        &self.analysis.url
    }

    pub fn is_tombstoned(&self) -> bool {
        self.deleted_at.is_some()
    }
}
