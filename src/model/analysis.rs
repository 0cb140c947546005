use crate::model::MarkupVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Heading tags counted by the analyzer, in level order
pub const HEADING_LEVELS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Per-level heading counts
///
/// Always holds all six keys `h1`..`h6`; levels absent from a page count 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct HeadingCounts([u32; 6]);

impl HeadingCounts {
    pub fn new() -> Self {
        Self([0; 6])
    }

    /// Sets the count for a level (1-based). Levels outside 1..=6 are ignored.
    pub fn set(&mut self, level: usize, count: u32) {
        if let Some(slot) = level.checked_sub(1).and_then(|i| self.0.get_mut(i)) {
            *slot = count;
        }
    }

    /// Count for a level (1-based); 0 for levels outside 1..=6
    pub fn get(&self, level: usize) -> u32 {
        level
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Count for a tag name such as `"h3"`
    pub fn get_tag(&self, tag: &str) -> u32 {
        HEADING_LEVELS
            .iter()
            .position(|t| *t == tag)
            .map(|i| self.0[i])
            .unwrap_or(0)
    }

    /// Total number of heading elements across all levels
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Iterates `(tag, count)` pairs in level order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        HEADING_LEVELS.iter().copied().zip(self.0.iter().copied())
    }
}

impl Default for HeadingCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<String, u32>> for HeadingCounts {
    fn from(map: BTreeMap<String, u32>) -> Self {
        let mut counts = Self::new();
        for (i, tag) in HEADING_LEVELS.iter().enumerate() {
            if let Some(count) = map.get(*tag) {
                counts.0[i] = *count;
            }
        }
        counts
    }
}

impl From<HeadingCounts> for BTreeMap<String, u32> {
    fn from(counts: HeadingCounts) -> Self {
        counts
            .iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect()
    }
}

/// A link that failed its reachability probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    /// Absolute URL of the link
    pub url: String,

    /// HTTP status of the probe, or 0 if the probe never got a response
    pub status_code: u16,

    /// Transport error text, present only when `status_code` is 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl BrokenLink {
    /// Broken link for a probe that received an error status
    pub fn from_status(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status_code,
            error_message: None,
        }
    }

    /// Broken link for a probe that failed at the transport level
    pub fn from_error(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            error_message: Some(error.into()),
        }
    }
}

/// Structured result of analyzing one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    /// The page that was analyzed
    pub url: String,
    pub markup_version: MarkupVersion,
    /// Text of the first `<title>`, empty if absent
    pub title: String,
    pub headings: HeadingCounts,
    pub internal_links: u32,
    pub external_links: u32,
    pub inaccessible_links: u32,
    /// Failed probes in anchor order
    pub broken_links: Vec<BrokenLink>,
    pub has_login_form: bool,
}

impl PageAnalysis {
    /// Creates an empty analysis for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markup_version: MarkupVersion::Unknown,
            title: String::new(),
            headings: HeadingCounts::new(),
            internal_links: 0,
            external_links: 0,
            inaccessible_links: 0,
            broken_links: Vec::new(),
            has_login_form: false,
        }
    }
}
