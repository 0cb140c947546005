//! Link classification and reachability probing
//!
//! Every resolved anchor is bucketed as internal or external by comparing its
//! authority, as written, with the page's, then probed with a HEAD request under a short
//! timeout. Probe failures are never errors: they become broken-link entries.

use crate::crawler::DocumentLink;
use crate::model::{BrokenLink, PageAnalysis};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Which side of the site boundary a link falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkBucket {
    Internal,
    External,
}

/// Result of probing one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Any response outside 400..600, redirects included
    Reachable(u16),

    /// Response status in 400..600
    ErrorStatus(u16),

    /// No response: connection failure, timeout, TLS error, ...
    Failed(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable(_))
    }

    /// Broken-link entry for this outcome, None if the link is reachable
    pub fn broken_link(&self, url: &str) -> Option<BrokenLink> {
        match self {
            Self::Reachable(_) => None,
            Self::ErrorStatus(status) => Some(BrokenLink::from_status(url, *status)),
            Self::Failed(error) => Some(BrokenLink::from_error(url, error.clone())),
        }
    }
}

/// Classification and probe result for one anchor
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub url: Url,
    pub bucket: LinkBucket,
    pub outcome: ProbeOutcome,
}

/// Settings for a batch of probes
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    /// Per-probe timeout
    pub timeout: Duration,

    /// Maximum probes in flight
    pub concurrency: usize,
}

/// Authority of a URL reference exactly as written, without userinfo
///
/// Returns None for a relative reference, which inherits the page's
/// authority, and an empty string for a scheme with no authority such as
/// `mailto:`. Case and ports are left untouched.
pub fn written_authority(reference: &str) -> Option<&str> {
    let reference = reference.trim();
    let rest = match split_scheme(reference) {
        Some(rest) => match rest.strip_prefix("//") {
            Some(rest) => rest,
            None => return Some(""),
        },
        None => reference.strip_prefix("//")?,
    };

    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    Some(authority.rsplit_once('@').map_or(authority, |(_, host)| host))
}

fn split_scheme(reference: &str) -> Option<&str> {
    let (scheme, rest) = reference.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(rest)
}

/// Buckets an href relative to the page it was found on
///
/// Internal iff the href's authority string equals `page_authority` exactly.
/// No `www.` stripping, case folding or default-port removal.
pub fn classify_link(href: &str, page_authority: &str) -> LinkBucket {
    let authority = written_authority(href).unwrap_or(page_authority);
    if authority == page_authority {
        LinkBucket::Internal
    } else {
        LinkBucket::External
    }
}

/// Sends a HEAD request to `url` and classifies the response
pub async fn probe_link(client: &Client, url: &str, timeout: Duration) -> ProbeOutcome {
    match client.head(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if (400..600).contains(&status) {
                ProbeOutcome::ErrorStatus(status)
            } else {
                ProbeOutcome::Reachable(status)
            }
        }
        Err(e) => ProbeOutcome::Failed(e.to_string()),
    }
}

/// Classifies and probes every link, returning reports in input order
///
/// Probes run concurrently, at most `settings.concurrency` at a time. Each
/// probe is bounded by its own timeout, so a hung link never holds up its
/// siblings beyond that bound.
pub async fn probe_links(
    client: &Client,
    links: Vec<DocumentLink>,
    page_authority: &str,
    settings: ProbeSettings,
) -> Vec<LinkReport> {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, link) in links.iter().enumerate() {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let target = link.url.to_string();
        let timeout = settings.timeout;

        join_set.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => probe_link(&client, &target, timeout).await,
                Err(e) => ProbeOutcome::Failed(e.to_string()),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; links.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if let Some(slot) = outcomes.get_mut(index) {
                    *slot = Some(outcome);
                }
            }
            Err(e) => tracing::warn!("Probe task failed: {}", e),
        }
    }

    links
        .into_iter()
        .zip(outcomes)
        .map(|(link, outcome)| {
            let outcome =
                outcome.unwrap_or_else(|| ProbeOutcome::Failed("probe task aborted".to_string()));
            tracing::debug!("Probed {}: {:?}", link.url, outcome);
            LinkReport {
                bucket: classify_link(&link.href, page_authority),
                url: link.url,
                outcome,
            }
        })
        .collect()
}

/// Folds link reports into the analysis counters, preserving report order
pub fn tally_links(analysis: &mut PageAnalysis, reports: &[LinkReport]) {
    for report in reports {
        match report.bucket {
            LinkBucket::Internal => analysis.internal_links += 1,
            LinkBucket::External => analysis.external_links += 1,
        }

        if let Some(broken) = report.outcome.broken_link(report.url.as_str()) {
            analysis.inaccessible_links += 1;
            analysis.broken_links.push(broken);
        }
    }
}
