//! Configuration module for Rankcrawl
//!
//! This module handles the optional TOML settings file, the JSON pattern
//! file and the validated [`CrawlConfig`] shared by all crawl workers.
//!
//! # Example
//!
//! ```no_run
//! use rankcrawl::config::{load_settings, load_patterns};
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("crawl.toml")).unwrap();
//! let patterns = load_patterns(Path::new(&settings.input.patterns_path));
//! println!("Crawler will use {} jobs and {} patterns", settings.crawler.jobs, patterns.len());
//! ```

mod parser;
mod patterns;
mod types;
mod validation;

// Re-export types
pub use patterns::{load_patterns, parse_patterns, Patterns};
pub use types::{
    CrawlConfig, CrawlerSettings, InputSettings, OutputSettings, Settings, UserAgentSettings,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_TIMEOUT_SECS, MAX_JOBS,
};

// Re-export parser functions
pub use parser::{compute_file_hash, load_settings, load_settings_with_hash};
pub use validation::validate;
