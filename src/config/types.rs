use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for PageLens
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP fetching and link probing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Upper bound on the primary page fetch (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for each link reachability probe (milliseconds)
    #[serde(rename = "probe-timeout-ms")]
    pub probe_timeout_ms: u64,

    /// Maximum number of probes in flight at once
    #[serde(rename = "probe-concurrency")]
    pub probe_concurrency: usize,
}

impl FetcherConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("pagelens/{}", env!("CARGO_PKG_VERSION")),
            page_timeout_secs: 10,
            probe_timeout_ms: 2000,
            probe_concurrency: 8,
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "crawl_data.db".to_string(),
        }
    }
}
