use crate::config::patterns::Patterns;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on the number of concurrent crawl workers
pub const MAX_JOBS: usize = 1024;

/// Default capacity of each bounded pipeline queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default per-site fetch timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings file structure for Rankcrawl
///
/// Every section and key is optional; missing values fall back to the
/// defaults the command line uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crawler: CrawlerSettings,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentSettings,
    pub input: InputSettings,
    pub output: OutputSettings,
}

/// Crawler behavior settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerSettings {
    /// Number of concurrent workers (1-1024)
    pub jobs: usize,

    /// Crawl depth (1-3); validated but only level 1 is crawled
    pub level: u8,

    /// Capacity of the URI, result and error queues
    pub queue_capacity: usize,

    /// Per-site fetch timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            jobs: 1,
            level: 1,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// User agent identification settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentSettings {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentSettings {
    fn default() -> Self {
        Self {
            crawler_name: "rankcrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentSettings {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Input locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InputSettings {
    /// Path to the SQLite database holding the ranked domains
    pub database_path: String,

    /// Path to the JSON pattern map
    pub patterns_path: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            database_path: "sites.db".to_string(),
            patterns_path: "patterns.json".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputSettings {
    /// Path to the append-only results file
    pub results_path: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            results_path: "crawled.txt".to_string(),
        }
    }
}

/// Immutable crawl configuration shared read-only by every worker
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub jobs: usize,
    pub level: u8,
    pub queue_capacity: usize,
    pub timeout: Duration,
    pub patterns: Patterns,
}

impl CrawlConfig {
    /// Builds a crawl configuration from validated settings and loaded patterns
    pub fn from_settings(settings: &CrawlerSettings, patterns: Patterns) -> Self {
        Self {
            jobs: settings.jobs,
            level: settings.level,
            queue_capacity: settings.queue_capacity,
            timeout: Duration::from_secs(settings.timeout_secs),
            patterns,
        }
    }

    /// Creates a configuration with default queue sizing and timeout
    pub fn new(jobs: usize, patterns: Patterns) -> Self {
        Self {
            jobs,
            level: 1,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            patterns,
        }
    }
}
