//! Progress reporting
//!
//! Workers notify a [`ProgressObserver`] once per dequeued site, before
//! processing it. Sites drained without fetching after an interrupt are
//! notified too, so an observer always reaches the dispatched total.
//! Observers only watch; they cannot influence routing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Receives one notification per site taken off the queue
pub trait ProgressObserver: Send + Sync {
    fn on_dequeue(&self);
}

/// Observer that ignores all notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_dequeue(&self) {}
}

/// Observer that logs progress every `every` sites
#[derive(Debug)]
pub struct LogProgress {
    total: u64,
    every: u64,
    seen: AtomicU64,
    started: Instant,
}

impl LogProgress {
    /// Creates a progress logger for `total` expected sites
    pub fn new(total: u64, every: u64) -> Self {
        Self {
            total,
            every: every.max(1),
            seen: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Number of notifications received so far
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

impl ProgressObserver for LogProgress {
    fn on_dequeue(&self) {
        let seen = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % self.every != 0 && seen != self.total {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            seen as f64 / elapsed
        } else {
            0.0
        };
        tracing::info!(
            "Progress: {}/{} sites, {:.2} sites/sec",
            seen,
            self.total,
            rate
        );
    }
}
