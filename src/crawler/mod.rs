//! Crawler module for the ranked-site crawl pipeline
//!
//! This module contains the core crawling logic, including:
//! - A cursor producer walking the ordered store from a skip threshold
//! - A fixed-size worker pool performing fetch + pattern match
//! - Page fetching and HTML metadata extraction
//! - Progress observers and cooperative shutdown
//!
//! Data flows `store -> producer -> bounded queue -> workers -> {results, errors}`.

mod coordinator;
mod cursor;
mod fetcher;
mod matcher;
mod parser;
mod pool;
mod progress;

pub use coordinator::{repeatable_signal, run_crawl, Crawler, ShutdownCoordinator};
pub use cursor::{produce_uris, ProducerReport, SkipThreshold};
pub use fetcher::{build_http_client, site_url, FetchError, HttpFetcher, PageFetcher, PageMetadata};
pub use matcher::{fetch_and_match, match_patterns, CrawlResult, FetchOutcome};
pub use parser::{parse_page, PageInfo};
pub use pool::{PoolReport, WorkerPool};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
