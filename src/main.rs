//! PageLens main entry point
//!
//! This is the command-line interface for the PageLens page analyzer.

use clap::{Parser, Subcommand};
use pagelens::config::{load_config_with_hash, validate, Config};
use pagelens::crawler::Crawler;
use pagelens::output::{
    to_json, AnalyzeResponse, BulkDeleteResponse, BulkRerunResponse, HistoryResponse,
};
use pagelens::storage::{open_storage, SqliteStorage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// PageLens: single-page structure analysis
///
/// Fetches a page, records its markup version, title, headings, link
/// breakdown, broken links and login-form presence, and keeps one stored
/// analysis per URL.
#[derive(Parser, Debug)]
#[command(name = "pagelens")]
#[command(version)]
#[command(about = "Analyze web page structure and keep a history", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the database path from the configuration
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one URL and store the result
    Analyze {
        /// The page to analyze
        url: String,
    },

    /// List all stored analyses
    History,

    /// Show one stored analysis
    Show {
        /// Record id
        id: i64,
    },

    /// Permanently delete stored analyses
    Delete {
        /// Record ids
        ids: Vec<i64>,
    },

    /// Re-run the analysis for stored records
    Rerun {
        /// Record ids
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.storage.database_path = database;
        validate(&config)?;
    }

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let crawler = Crawler::new(&config.fetcher, storage)?;

    let rendered = match run_command(&crawler, cli.command).await {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e);
        }
    };

    println!("{}", rendered);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON response.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagelens=info,warn"),
            1 => EnvFilter::new("pagelens=debug,info"),
            2 => EnvFilter::new("pagelens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if given, otherwise the defaults
fn load_configuration(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Dispatches one command and renders its response
async fn run_command(
    crawler: &Crawler<SqliteStorage>,
    command: Command,
) -> Result<String, Box<dyn std::error::Error>> {
    let json = match command {
        Command::Analyze { url } => {
            let record = crawler.run_single(&url).await?;
            to_json(&AnalyzeResponse::from_record(&record))?
        }
        Command::History => to_json(&HistoryResponse::new(crawler.history()?))?,
        Command::Show { id } => to_json(&crawler.record(id)?)?,
        Command::Delete { ids } => to_json(&BulkDeleteResponse::new(crawler.bulk_delete(&ids)?))?,
        Command::Rerun { ids } => {
            to_json(&BulkRerunResponse::new(crawler.run_bulk_rerun(&ids).await?))?
        }
    };
    Ok(json)
}
