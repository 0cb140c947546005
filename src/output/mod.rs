//! Output module for rendering operation results
//!
//! Each front-end operation has one response shape here, serialized as JSON:
//! - `AnalyzeResponse` for a single analysis
//! - `HistoryResponse` for the stored history
//! - `BulkDeleteResponse` and `BulkRerunResponse` for the bulk operations

use crate::crawler::RerunSummary;
use crate::model::{HeadingCounts, MarkupVersion};
use crate::storage::StoredRecord;
use serde::Serialize;

/// Analysis fields returned to the caller of a single analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub markup_version: MarkupVersion,
    pub title: String,
    pub headings: HeadingCounts,
    pub internal_links: u32,
    pub external_links: u32,
    pub inaccessible_links: u32,
    pub has_login_form: bool,
}

/// Response for a single analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisSummary,
    pub record_id: i64,
    pub message: String,
}

impl AnalyzeResponse {
    pub fn from_record(record: &StoredRecord) -> Self {
        let analysis = &record.analysis;
        Self {
            result: AnalysisSummary {
                markup_version: analysis.markup_version,
                title: analysis.title.clone(),
                headings: analysis.headings.clone(),
                internal_links: analysis.internal_links,
                external_links: analysis.external_links,
                inaccessible_links: analysis.inaccessible_links,
                has_login_form: analysis.has_login_form,
            },
            record_id: record.id,
            message: "Crawl result saved successfully".to_string(),
        }
    }
}

/// Response listing stored analyses
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<StoredRecord>,
    pub count: usize,
}

impl HistoryResponse {
    pub fn new(history: Vec<StoredRecord>) -> Self {
        let count = history.len();
        Self { history, count }
    }
}

/// Response for a bulk hard delete
#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: usize,
}

impl BulkDeleteResponse {
    pub fn new(deleted_count: usize) -> Self {
        Self {
            message: format!("Successfully deleted {} crawl results", deleted_count),
            deleted_count,
        }
    }
}

/// Response for a bulk re-run
#[derive(Debug, Clone, Serialize)]
pub struct BulkRerunResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: RerunSummary,
}

impl BulkRerunResponse {
    pub fn new(summary: RerunSummary) -> Self {
        Self {
            message: format!(
                "Re-run completed: {} successful, {} failed",
                summary.success_count, summary.failed_count
            ),
            summary,
        }
    }
}

/// Renders a response as pretty-printed JSON
pub fn to_json<T: Serialize>(response: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}
