//! Logo-Scout: a polite logo and favicon finder
//!
//! This crate fetches the home page of each input domain under bounded
//! concurrency, runs an ordered set of extraction strategies over the markup,
//! and emits exactly one crawl record per domain with the most likely logo URL
//! and favicon URL.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod metrics;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Logo-Scout operations
///
/// Only process-level failures end up here. Per-domain problems are recorded
/// on the crawl record as a [`FailureKind`] and never abort a run.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty reference")]
    Empty,
}

/// Result type alias for Logo-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, DomainProcessor, Fetcher, Scheduler};
pub use extract::{Candidate, Strategy};
pub use metrics::{Metrics, MetricsSnapshot};
pub use output::{CsvEmitter, OutputError, ResultEmitter};
pub use state::{CrawlRecord, FailureKind, Outcome};
pub use crate::url::{resolve, DomainTask};
