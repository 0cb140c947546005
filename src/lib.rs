//! PageLens: single-page structure analysis with persistent history
//!
//! This crate fetches one web page, extracts structural facts from it (markup
//! version, title, heading distribution, link classification, broken links,
//! login-form presence) and keeps one stored analysis per URL.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for PageLens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl LensError {
    /// Returns true if this error is a lookup miss by record id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Storage(storage::StorageError::RecordNotFound(_))
        )
    }
}

/// Errors raised while fetching the primary document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => url,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for PageLens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{analyze_document, Crawler};
pub use model::{BrokenLink, HeadingCounts, MarkupVersion, PageAnalysis};
pub use storage::{SqliteStorage, Storage, StoredRecord};
