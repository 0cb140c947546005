//! Analysis data model
//!
//! This module defines the values produced by one analysis of one page:
//! - The inferred markup version
//! - Heading counts per level
//! - Broken links found while probing anchors
//! - The aggregate `PageAnalysis` handed to the record store

mod analysis;
mod markup;

pub use analysis::{BrokenLink, HeadingCounts, PageAnalysis, HEADING_LEVELS};
pub use markup::MarkupVersion;
