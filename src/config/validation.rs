use crate::config::types::{Config, FetcherConfig, StorageConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !(1..=300).contains(&config.page_timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "page_timeout_secs must be between 1 and 300, got {}",
            config.page_timeout_secs
        )));
    }

    if !(100..=60_000).contains(&config.probe_timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "probe_timeout_ms must be between 100 and 60000, got {}ms",
            config.probe_timeout_ms
        )));
    }

    if !(1..=64).contains(&config.probe_concurrency) {
        return Err(ConfigError::Validation(format!(
            "probe_concurrency must be between 1 and 64, got {}",
            config.probe_concurrency
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
