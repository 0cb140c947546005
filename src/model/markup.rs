//! Markup version inferred from a parsed document
//!
//! The inference is a heuristic over the root element and the leading node,
//! not a conformance check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Markup version of an analyzed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarkupVersion {
    /// Document starts with a DOCTYPE, or the root element carries `lang`
    #[serde(rename = "HTML5")]
    Html5,

    /// Root element declares an XHTML namespace
    #[serde(rename = "XHTML")]
    Xhtml,

    /// None of the signals matched
    #[default]
    Unknown,
}

impl MarkupVersion {
    /// Returns the string stored in the database for this version
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Html5 => "HTML5",
            Self::Xhtml => "XHTML",
            Self::Unknown => "Unknown",
        }
    }

    /// Parses a version from its database representation
    ///
    /// Returns None if the string is not a recognized version
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "HTML5" => Some(Self::Html5),
            "XHTML" => Some(Self::Xhtml),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for MarkupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
