//! Crawl run summary

use chrono::{DateTime, Utc};

/// Final state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The store scan finished and every queued site was processed
    Completed,
    /// A shutdown signal stopped the run early
    Interrupted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Counters and timing of a finished crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Sites pushed onto the queue
    pub dispatched: u64,
    /// Sites fetched and routed
    pub processed: u64,
    pub matched: u64,
    pub no_match: u64,
    pub errors: u64,
    /// Sites whose outcome was dropped because of an interruption
    pub skipped: u64,
    /// Records written to the output
    pub written: u64,
}

impl CrawlSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Returns the share of fetched sites that matched, as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.matched as f64 / self.processed as f64) * 100.0
    }
}
