//! Fixed-size crawl worker pool
//!
//! `jobs` workers share one bounded URI queue. Each worker classifies the
//! outcome of every site it takes:
//! - match    -> the result is sent on the result queue
//! - no match -> dropped silently
//! - failure  -> a unit value is sent on the error queue (count only)
//!
//! Once cancelled, workers let their in-flight fetch finish but discard its
//! outcome, then drain the remaining queue without fetching. Nothing is
//! routed to the output queues after cancellation. The pool closes both
//! output queues only after every worker has exited.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::matcher::{fetch_and_match, CrawlResult, FetchOutcome};
use crate::crawler::progress::ProgressObserver;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Per-run worker counters
///
/// `processed == matched + no_match + errors` and
/// `dispatched == processed + skipped` once a run has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Sites pushed onto the queue by the producer
    pub dispatched: u64,
    /// Sites fetched and routed
    pub processed: u64,
    pub matched: u64,
    pub no_match: u64,
    pub errors: u64,
    /// Sites dequeued after cancellation, or whose fetch finished after it;
    /// their outcome is never routed
    pub skipped: u64,
}

impl PoolReport {
    fn merge(&mut self, other: PoolReport) {
        self.dispatched += other.dispatched;
        self.processed += other.processed;
        self.matched += other.matched;
        self.no_match += other.no_match;
        self.errors += other.errors;
        self.skipped += other.skipped;
    }
}

/// Pool of crawl workers
pub struct WorkerPool {
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn ProgressObserver>,
}

impl WorkerPool {
    pub fn new(
        config: Arc<CrawlConfig>,
        fetcher: Arc<dyn PageFetcher>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            config,
            fetcher,
            observer,
        }
    }

    /// Runs `config.jobs` workers until the URI queue is closed and drained
    ///
    /// Takes ownership of both output senders and drops them after the join
    /// barrier, which closes the output queues exactly once.
    pub async fn run(
        &self,
        uris: mpsc::Receiver<String>,
        results: mpsc::Sender<CrawlResult>,
        errors: mpsc::Sender<()>,
        cancel: CancellationToken,
    ) -> PoolReport {
        let uris = Arc::new(Mutex::new(uris));
        let jobs = self.config.jobs.max(1);

        let mut handles = Vec::with_capacity(jobs);
        for id in 0..jobs {
            let worker = Worker {
                id,
                uris: Arc::clone(&uris),
                results: results.clone(),
                errors: errors.clone(),
                config: Arc::clone(&self.config),
                fetcher: Arc::clone(&self.fetcher),
                observer: Arc::clone(&self.observer),
                cancel: cancel.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        let mut report = PoolReport::default();
        for handle in handles {
            match handle.await {
                Ok(worker_report) => report.merge(worker_report),
                Err(e) => tracing::error!("Crawl worker failed: {}", e),
            }
        }

        drop(results);
        drop(errors);

        report
    }
}

struct Worker {
    id: usize,
    uris: Arc<Mutex<mpsc::Receiver<String>>>,
    results: mpsc::Sender<CrawlResult>,
    errors: mpsc::Sender<()>,
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) -> PoolReport {
        let mut report = PoolReport::default();

        loop {
            let next = {
                let mut uris = self.uris.lock().await;
                uris.recv().await
            };
            let Some(uri) = next else {
                break;
            };

            self.observer.on_dequeue();

            if self.cancel.is_cancelled() {
                report.skipped += 1;
                continue;
            }

            let outcome = fetch_and_match(
                self.fetcher.as_ref(),
                &uri,
                &self.config.patterns,
                self.config.timeout,
            )
            .await;

            if self.cancel.is_cancelled() {
                tracing::debug!("Discarding outcome for {} after interrupt", uri);
                report.skipped += 1;
                continue;
            }
            report.processed += 1;

            match outcome {
                FetchOutcome::Success(result) => {
                    report.matched += 1;
                    tracing::debug!("{} matched {:?}", uri, result.patterns);
                    if self.results.send(result).await.is_err() {
                        tracing::warn!("Result sink closed, dropping result for {}", uri);
                    }
                }
                FetchOutcome::NoMatch => {
                    report.no_match += 1;
                }
                FetchOutcome::Failure(e) => {
                    report.errors += 1;
                    tracing::trace!("error crawling resource: {}", e);
                    if self.errors.send(()).await.is_err() {
                        tracing::warn!("Error sink closed");
                    }
                }
            }
        }

        tracing::debug!(
            "Worker {} exiting after {} sites",
            self.id,
            report.processed
        );
        report
    }
}
