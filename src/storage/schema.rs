//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the PageLens database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per analyzed URL; tombstoned rows linger until purged
CREATE TABLE IF NOT EXISTS crawl_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    markup_version TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    headings TEXT NOT NULL,
    internal_links INTEGER NOT NULL DEFAULT 0,
    external_links INTEGER NOT NULL DEFAULT 0,
    inaccessible_links INTEGER NOT NULL DEFAULT 0,
    broken_links TEXT NOT NULL,
    has_login_form INTEGER NOT NULL DEFAULT 0,
    crawled_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- At most one live row per URL
CREATE UNIQUE INDEX IF NOT EXISTS idx_crawl_records_live_url
    ON crawl_records(url) WHERE deleted_at IS NULL;

CREATE INDEX IF NOT EXISTS idx_crawl_records_deleted_at ON crawl_records(deleted_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
