//! Result and error sinks
//!
//! Each sink is a single consumer draining one output queue of the worker
//! pool. The result sink writes records on a blocking thread and flushes
//! after each one; the error sink only counts.

use crate::crawler::CrawlResult;
use crate::output::record::write_record;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shared, monotonically increasing failure count
#[derive(Debug, Clone, Default)]
pub struct ErrorCounter(Arc<AtomicU64>);

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value; may still grow while the error sink is running
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Spawns the result sink and returns the number of records written
///
/// A record that fails to write is logged and skipped.
pub fn spawn_result_sink<W>(mut results: mpsc::Receiver<CrawlResult>, writer: W) -> JoinHandle<u64>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut writer = writer;
        let mut written = 0;
        while let Some(result) = results.blocking_recv() {
            match write_record(&mut writer, &result) {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!("error saving result for {}: {}", result.url, e),
            }
        }
        written
    })
}

/// Spawns the error sink, which increments `counter` once per failure
pub fn spawn_error_sink(mut errors: mpsc::Receiver<()>, counter: ErrorCounter) -> JoinHandle<()> {
    tokio::spawn(async move {
        while errors.recv().await.is_some() {
            counter.increment();
        }
    })
}
