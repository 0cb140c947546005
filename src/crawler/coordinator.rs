//! Crawler coordinator - pipeline orchestration
//!
//! This module ties the pipeline stages together:
//! - Fetching the page, analyzing it, upserting the result
//! - Bulk re-runs of stored URLs with per-item fault isolation
//! - Store passthroughs for history, lookup and bulk deletion

use crate::config::FetcherConfig;
use crate::crawler::{analyze_document, build_http_client, fetch_document, ProbeSettings};
use crate::model::PageAnalysis;
use crate::storage::{Storage, StorageError, StorageResult, StoredRecord};
use crate::{LensError, Result};
use reqwest::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Outcome of a bulk re-run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RerunSummary {
    pub success_count: usize,
    pub failed_count: usize,

    /// URLs whose re-run failed; ids that did not resolve contribute no URL
    pub failed_urls: Vec<String>,
}

/// Main pipeline coordinator
///
/// Holds the HTTP client and an injected record store. Cloning is cheap and
/// clones share the same store.
pub struct Crawler<S> {
    client: Client,
    probe_settings: ProbeSettings,
    storage: Arc<Mutex<S>>,
}

impl<S> Clone for Crawler<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            probe_settings: self.probe_settings,
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> Crawler<S> {
    /// Creates a new coordinator that owns `storage`
    ///
    /// # Arguments
    ///
    /// * `config` - The fetcher configuration
    /// * `storage` - The record store
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created coordinator
    /// * `Err(LensError)` - Failed to build the HTTP client
    pub fn new(config: &FetcherConfig, storage: S) -> Result<Self> {
        Self::with_shared_storage(config, Arc::new(Mutex::new(storage)))
    }

    /// Creates a coordinator over a store shared with other owners
    pub fn with_shared_storage(config: &FetcherConfig, storage: Arc<Mutex<S>>) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self {
            client,
            probe_settings: ProbeSettings {
                timeout: config.probe_timeout(),
                concurrency: config.probe_concurrency,
            },
            storage,
        })
    }

    /// Handle to the underlying store
    pub fn storage(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.storage)
    }

    /// Runs a closure against the store
    ///
    /// The lock is never held across an await point.
    fn with_storage<T>(&self, f: impl FnOnce(&mut S) -> StorageResult<T>) -> Result<T> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| StorageError::Database("record store lock poisoned".to_string()))?;
        Ok(f(&mut *storage)?)
    }

    /// Fetches and analyzes `url` without persisting the result
    pub async fn analyze(&self, url: &str) -> Result<PageAnalysis> {
        let html = fetch_document(&self.client, url).await?;
        analyze_document(&self.client, &html, url, self.probe_settings).await
    }

    /// Runs the full pipeline for one URL
    ///
    /// Fetch, analyze, then upsert. The first failing stage ends the run and
    /// nothing is persisted.
    pub async fn run_single(&self, url: &str) -> Result<StoredRecord> {
        tracing::info!("Analyzing {}", url);

        let analysis = self.analyze(url).await?;
        let record = self.with_storage(|storage| storage.upsert(url, &analysis))?;

        tracing::info!(
            "Stored analysis of {} as record {} ({} broken links)",
            url,
            record.id,
            record.analysis.broken_links.len()
        );
        Ok(record)
    }

    /// Re-runs the pipeline for each stored record id, in input order
    ///
    /// A failure on one id, whether lookup, fetch, parse or persistence, is
    /// counted and logged and does not stop the loop.
    ///
    /// # Returns
    ///
    /// * `Ok(RerunSummary)` - Per-item results
    /// * `Err(LensError::InvalidRequest)` - `ids` is empty
    pub async fn run_bulk_rerun(&self, ids: &[i64]) -> Result<RerunSummary> {
        require_ids(ids)?;

        let mut summary = RerunSummary::default();

        for &id in ids {
            let url = match self.with_storage(|storage| storage.get_by_id(id)) {
                Ok(record) => record.analysis.url,
                Err(e) => {
                    tracing::warn!("Re-run of record {} skipped: {}", id, e);
                    summary.failed_count += 1;
                    continue;
                }
            };

            match self.run_single(&url).await {
                Ok(_) => summary.success_count += 1,
                Err(e) => {
                    tracing::warn!("Re-run of {} failed: {}", url, e);
                    summary.failed_count += 1;
                    summary.failed_urls.push(url);
                }
            }
        }

        tracing::info!(
            "Re-run completed: {} successful, {} failed",
            summary.success_count,
            summary.failed_count
        );
        Ok(summary)
    }

    /// All live records
    pub fn history(&self) -> Result<Vec<StoredRecord>> {
        self.with_storage(|storage| storage.list_all())
    }

    /// One live record by id
    pub fn record(&self, id: i64) -> Result<StoredRecord> {
        self.with_storage(|storage| storage.get_by_id(id))
    }

    /// Hard-deletes records by id, returning how many rows were removed
    pub fn bulk_delete(&self, ids: &[i64]) -> Result<usize> {
        require_ids(ids)?;
        let removed = self.with_storage(|storage| storage.bulk_hard_delete(ids))?;
        tracing::info!("Deleted {} of {} requested records", removed, ids.len());
        Ok(removed)
    }
}

fn require_ids(ids: &[i64]) -> Result<()> {
    if ids.is_empty() {
        return Err(LensError::InvalidRequest("No IDs provided".to_string()));
    }
    Ok(())
}
