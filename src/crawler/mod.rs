//! Crawler module for single-page analysis
//!
//! This module contains the analysis pipeline, including:
//! - HTTP fetching of the page under analysis
//! - HTML parsing into structural facts
//! - Link classification and reachability probing
//! - Orchestration of fetch, analysis and persistence

mod coordinator;
mod fetcher;
mod parser;
mod prober;

pub use coordinator::{Crawler, RerunSummary};
pub use fetcher::{build_http_client, fetch_document};
pub use parser::{parse_document, DocumentLink, ParsedDocument};
pub use prober::{
    classify_link, probe_link, probe_links, tally_links, written_authority, LinkBucket,
    LinkReport, ProbeOutcome, ProbeSettings,
};

use crate::model::PageAnalysis;
use crate::{LensError, Result};
use reqwest::Client;
use url::Url;

/// Analyzes a fetched document
///
/// This is the analyzer entry point. It will:
/// 1. Parse `source_url` as the base for relative links
/// 2. Extract markup version, title, headings and login-form presence
/// 3. Resolve every anchor and probe it
/// 4. Fold link buckets and probe failures into the counters
///
/// # Arguments
///
/// * `client` - HTTP client used for link probes
/// * `html` - The raw document
/// * `source_url` - The URL the document was fetched from
/// * `settings` - Probe timeout and concurrency
///
/// # Returns
///
/// * `Ok(PageAnalysis)` - The analysis; probe failures are part of it
/// * `Err(LensError::HtmlParse)` - `source_url` is not a usable base URL
pub async fn analyze_document(
    client: &Client,
    html: &str,
    source_url: &str,
    settings: ProbeSettings,
) -> Result<PageAnalysis> {
    let base_url = Url::parse(source_url).map_err(|e| LensError::HtmlParse {
        url: source_url.to_string(),
        message: format!("invalid base URL: {}", e),
    })?;

    let parsed = parse_document(html, &base_url);

    let mut analysis = PageAnalysis::new(source_url);
    analysis.markup_version = parsed.markup_version;
    analysis.title = parsed.title;
    analysis.headings = parsed.headings;
    analysis.has_login_form = parsed.has_login_form;

    let page_authority = written_authority(source_url).unwrap_or_default();
    let reports = probe_links(client, parsed.links, page_authority, settings).await;
    tally_links(&mut analysis, &reports);

    tracing::debug!(
        "Analyzed {}: {} internal, {} external, {} inaccessible, {} anchors skipped",
        source_url,
        analysis.internal_links,
        analysis.external_links,
        analysis.inaccessible_links,
        parsed.skipped_anchors
    );

    Ok(analysis)
}
