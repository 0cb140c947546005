//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::{BrokenLink, HeadingCounts, MarkupVersion, PageAnalysis};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::StoredRecord;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// Column list shared by every query that maps rows through `map_record`
const RECORD_COLUMNS: &str = "id, url, markup_version, title, headings, internal_links,
    external_links, inaccessible_links, broken_links, has_login_form,
    crawled_at, created_at, updated_at, deleted_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Separate connections to the same file wait on each other's upserts
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened record store at {}", path.display());
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_record<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> StorageResult<Option<StoredRecord>> {
        let record = self.conn.query_row(sql, params, map_record).optional()?;
        Ok(record)
    }
}

impl Storage for SqliteStorage {
    fn upsert(&mut self, url: &str, analysis: &PageAnalysis) -> StorageResult<StoredRecord> {
        let headings = serde_json::to_string(&analysis.headings)?;
        let broken_links = serde_json::to_string(&analysis.broken_links)?;
        let now = Utc::now().to_rfc3339();

        // IMMEDIATE takes the write lock up front so racing upserts serialize
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let purged = tx.execute(
            "DELETE FROM crawl_records WHERE url = ?1 AND deleted_at IS NOT NULL",
            params![url],
        )?;
        if purged > 0 {
            tracing::debug!("Purged {} tombstoned record(s) for {}", purged, url);
        }

        tx.execute(
            "INSERT INTO crawl_records (url, markup_version, title, headings, internal_links,
                external_links, inaccessible_links, broken_links, has_login_form,
                crawled_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?10)
             ON CONFLICT(url) WHERE deleted_at IS NULL DO UPDATE SET
                markup_version = excluded.markup_version,
                title = excluded.title,
                headings = excluded.headings,
                internal_links = excluded.internal_links,
                external_links = excluded.external_links,
                inaccessible_links = excluded.inaccessible_links,
                broken_links = excluded.broken_links,
                has_login_form = excluded.has_login_form,
                crawled_at = excluded.crawled_at,
                updated_at = excluded.updated_at",
            params![
                url,
                analysis.markup_version.to_db_string(),
                analysis.title,
                headings,
                analysis.internal_links,
                analysis.external_links,
                analysis.inaccessible_links,
                broken_links,
                analysis.has_login_form,
                now,
            ],
        )?;

        let record = tx.query_row(
            &format!(
                "SELECT {} FROM crawl_records WHERE url = ?1 AND deleted_at IS NULL",
                RECORD_COLUMNS
            ),
            params![url],
            map_record,
        )?;

        tx.commit()?;
        Ok(record)
    }

    fn list_all(&self) -> StorageResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawl_records WHERE deleted_at IS NULL ORDER BY id",
            RECORD_COLUMNS
        ))?;

        let records = stmt
            .query_map([], map_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn get_by_id(&self, id: i64) -> StorageResult<StoredRecord> {
        self.query_record(
            &format!(
                "SELECT {} FROM crawl_records WHERE id = ?1 AND deleted_at IS NULL",
                RECORD_COLUMNS
            ),
            params![id],
        )?
        .ok_or(StorageError::RecordNotFound(id))
    }

    fn get_by_url(&self, url: &str) -> StorageResult<Option<StoredRecord>> {
        self.query_record(
            &format!(
                "SELECT {} FROM crawl_records WHERE url = ?1 AND deleted_at IS NULL",
                RECORD_COLUMNS
            ),
            params![url],
        )
    }

    fn soft_delete(&mut self, ids: &[i64]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut marked = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE crawl_records SET deleted_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND deleted_at IS NULL",
            )?;
            for id in ids {
                marked += stmt.execute(params![now, id])?;
            }
        }
        tx.commit()?;
        Ok(marked)
    }

    fn bulk_hard_delete(&mut self, ids: &[i64]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM crawl_records WHERE id = ?1")?;
            for id in ids {
                removed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }
}

/// Maps a row selected with `RECORD_COLUMNS` into a record
fn map_record(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let markup: String = row.get(2)?;
    let headings: String = row.get(4)?;
    let broken_links: String = row.get(8)?;

    let analysis = PageAnalysis {
        url: row.get(1)?,
        markup_version: MarkupVersion::from_db_string(&markup).unwrap_or_default(),
        title: row.get(3)?,
        headings: decode_json::<HeadingCounts>(4, &headings)?,
        internal_links: row.get(5)?,
        external_links: row.get(6)?,
        inaccessible_links: row.get(7)?,
        broken_links: decode_json::<Vec<BrokenLink>>(8, &broken_links)?,
        has_login_form: row.get(9)?,
    };

    let deleted_at: Option<String> = row.get(13)?;

    Ok(StoredRecord {
        id: row.get(0)?,
        analysis,
        crawled_at: decode_timestamp(10, &row.get::<_, String>(10)?)?,
        created_at: decode_timestamp(11, &row.get::<_, String>(11)?)?,
        updated_at: decode_timestamp(12, &row.get::<_, String>(12)?)?,
        deleted_at: deleted_at
            .map(|value| decode_timestamp(13, &value))
            .transpose()?,
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(column: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn decode_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
