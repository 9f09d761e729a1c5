//! Rankcrawl: a bulk crawler for ranked domain lists
//!
//! This crate walks a rank-ordered list of domains persisted in a local
//! store, fetches each site, extracts page metadata and tests the body
//! against a set of named substring patterns. Matching sites are written
//! to an append-only output file; failures are only counted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Rankcrawl operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("no such bucket: {0}")]
    MissingNamespace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse patterns: {0}")]
    Patterns(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Rankcrawl operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, Patterns, Settings};
pub use crawler::{Crawler, CrawlResult, FetchOutcome};
pub use output::{CrawlSummary, RunStatus};
pub use storage::{OrderedStore, SqliteStore, SITES_NAMESPACE};
