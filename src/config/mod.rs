//! Configuration module for PageLens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a config file is supported.
//!
//! # Example
//!
//! ```no_run
//! use pagelens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagelens.toml")).unwrap();
//! println!("Probe timeout: {}ms", config.fetcher.probe_timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
