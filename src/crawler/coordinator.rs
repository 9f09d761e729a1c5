//! Crawl coordinator - pipeline orchestration and shutdown
//!
//! This module wires the crawl pipeline together:
//! - Checking the store namespace before any work starts
//! - Running the cursor producer on a blocking thread
//! - Running the worker pool against the bounded URI queue
//! - Draining the result and error sinks
//! - Watching for a shutdown signal and cancelling cooperatively
//! - Reporting the final counters exactly once

use crate::config::CrawlConfig;
use crate::crawler::cursor::{produce_uris, SkipThreshold};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::matcher::CrawlResult;
use crate::crawler::pool::{PoolReport, WorkerPool};
use crate::crawler::progress::{NoProgress, ProgressObserver};
use crate::output::{spawn_error_sink, spawn_result_sink, CrawlSummary, ErrorCounter, RunStatus};
use crate::storage::{OrderedStore, SITES_NAMESPACE};
use crate::CrawlerError;
use chrono::Utc;
use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Crawler over a ranked domain store
///
/// The store is only read, and only by the producer thread.
pub struct Crawler<S> {
    store: Arc<Mutex<S>>,
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn ProgressObserver>,
}

impl<S: OrderedStore + Send + 'static> Crawler<S> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `store` - The ranked domain store to walk
    /// * `config` - Worker count, queue sizing, timeout and patterns
    /// * `fetcher` - The page fetcher used by every worker
    pub fn new(store: S, config: CrawlConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(config),
            fetcher,
            observer: Arc::new(NoProgress),
        }
    }

    /// Replaces the progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Counts the sites a crawl with this skip offset would dispatch
    pub fn pending(&self, skip: u64) -> Result<u64, CrawlerError> {
        let threshold = SkipThreshold::new(skip);
        let store = lock_store(&self.store);
        if !store.has_namespace(SITES_NAMESPACE)? {
            return Err(CrawlerError::MissingNamespace(SITES_NAMESPACE.to_string()));
        }
        Ok(store.count_from(SITES_NAMESPACE, threshold.as_str())?)
    }

    /// Crawls every site whose rank key is at or above `skip`
    ///
    /// Results and failures are sent on the given queues, which are both
    /// closed once every worker has exited. Fails before any crawling if
    /// the sites namespace does not exist.
    pub async fn crawl(
        &self,
        results: mpsc::Sender<CrawlResult>,
        errors: mpsc::Sender<()>,
        skip: u64,
        cancel: CancellationToken,
    ) -> Result<PoolReport, CrawlerError> {
        let threshold = SkipThreshold::new(skip);
        {
            let store = lock_store(&self.store);
            if !store.has_namespace(SITES_NAMESPACE)? {
                return Err(CrawlerError::MissingNamespace(SITES_NAMESPACE.to_string()));
            }
        }

        let (uri_tx, uri_rx) = mpsc::channel(self.config.queue_capacity.max(1));

        let store = Arc::clone(&self.store);
        let producer_cancel = cancel.clone();
        let producer = tokio::task::spawn_blocking(move || {
            let store = lock_store(&store);
            let report = produce_uris(
                &*store,
                SITES_NAMESPACE,
                &threshold,
                &uri_tx,
                &producer_cancel,
            );
            drop(uri_tx);
            report
        });

        let pool = WorkerPool::new(
            Arc::clone(&self.config),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.observer),
        );
        let mut report = pool.run(uri_rx, results, errors, cancel).await;

        let produced = producer.await??;
        if produced.stopped_early {
            tracing::info!("Store scan stopped after {} sites", produced.emitted);
        }
        report.dispatched = produced.emitted;

        Ok(report)
    }
}

fn lock_store<S>(store: &Mutex<S>) -> MutexGuard<'_, S> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Watches a shutdown signal while the pipeline runs
///
/// When the signal fires the crawl is cancelled cooperatively: the
/// producer stops, in-flight fetches complete with their outcome dropped
/// and queued sites are drained without being fetched.
pub struct ShutdownCoordinator {
    finished: CancellationToken,
    handle: JoinHandle<bool>,
}

impl ShutdownCoordinator {
    /// Starts watching `signal`; firing it cancels `cancel`
    pub fn spawn<F>(signal: F, cancel: CancellationToken) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let finished = CancellationToken::new();
        let watch = finished.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = signal => {
                    tracing::warn!("Interrupt received, stopping crawl");
                    cancel.cancel();
                    true
                }
                _ = watch.cancelled() => false,
            }
        });

        Self { finished, handle }
    }

    /// Stops watching and returns whether the signal fired
    pub async fn finish(self) -> bool {
        self.finished.cancel();
        match self.handle.await {
            Ok(interrupted) => interrupted,
            Err(e) => {
                tracing::error!("Shutdown watcher failed: {}", e);
                false
            }
        }
    }
}

/// Resolves when `signal` first fires and arms a handler for a repeat
///
/// Each call of `signal` creates a fresh listener. After the first one
/// completes, a second listener is spawned in the background and
/// `on_repeat` runs if it fires too. The binary uses this to exit
/// immediately on a second Ctrl-C while a cancelled crawl is draining.
pub async fn repeatable_signal<F, Fut, R>(mut signal: F, on_repeat: R)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    R: FnOnce() + Send + 'static,
{
    signal().await;

    let repeat = signal();
    tokio::spawn(async move {
        repeat.await;
        on_repeat();
    });
}

/// Runs a complete crawl with its sinks and shutdown handling
///
/// Matching sites are written to `out` one flushed record at a time;
/// failures are counted. The run ends either when the store scan is
/// exhausted (`Completed`) or after `shutdown` fires and the pipeline has
/// drained (`Interrupted`). No record is written and no error is counted
/// for work that finishes after the signal. In both cases the final error
/// total is logged once, after the sinks have finished.
///
/// # Example
///
/// ```no_run
/// use rankcrawl::config::{CrawlConfig, Patterns, UserAgentSettings};
/// use rankcrawl::crawler::{build_http_client, run_crawl, Crawler, HttpFetcher};
/// use rankcrawl::storage::SqliteStore;
/// use std::path::Path;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::open(Path::new("sites.db"))?;
/// let client = build_http_client(&UserAgentSettings::default(), Duration::from_secs(10))?;
/// let crawler = Crawler::new(store, CrawlConfig::new(8, Patterns::new()), Arc::new(HttpFetcher::new(client)));
/// let summary = run_crawl(&crawler, 0, std::io::stdout(), async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// println!("{} matched", summary.matched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S, W, F>(
    crawler: &Crawler<S>,
    skip: u64,
    out: W,
    shutdown: F,
) -> Result<CrawlSummary, CrawlerError>
where
    S: OrderedStore + Send + 'static,
    W: Write + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let started_at = Utc::now();
    let capacity = crawler.config().queue_capacity.max(1);

    let (results_tx, results_rx) = mpsc::channel(capacity);
    let (errors_tx, errors_rx) = mpsc::channel(capacity);
    let counter = ErrorCounter::new();

    let result_sink = spawn_result_sink(results_rx, out);
    let error_sink = spawn_error_sink(errors_rx, counter.clone());

    let cancel = CancellationToken::new();
    let watcher = ShutdownCoordinator::spawn(shutdown, cancel.clone());

    tracing::info!(
        "Crawl started with {} jobs, skip {}",
        crawler.config().jobs,
        skip
    );
    let crawled = crawler.crawl(results_tx, errors_tx, skip, cancel).await;
    let interrupted = watcher.finish().await;

    let written = result_sink.await?;
    error_sink.await?;
    let report = crawled?;

    let status = if interrupted {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    };
    let summary = CrawlSummary {
        status,
        started_at,
        finished_at: Utc::now(),
        dispatched: report.dispatched,
        processed: report.processed,
        matched: report.matched,
        no_match: report.no_match,
        errors: counter.get(),
        skipped: report.skipped,
        written,
    };

    tracing::info!(
        "Crawl {}: {} sites fetched, {} matched ({:.1}%), {} without match, {} skipped in {}s",
        status.as_str(),
        summary.processed,
        summary.matched,
        summary.match_rate(),
        summary.no_match,
        summary.skipped,
        summary.duration_seconds()
    );
    tracing::info!("Errors total: {}", summary.errors);

    Ok(summary)
}
