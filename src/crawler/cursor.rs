//! Cursor producer over the ordered store
//!
//! The producer runs on a single blocking thread, scans the store in its
//! natural key order and pushes admitted domains onto the bounded URI
//! queue. A full queue blocks the scan, so store iteration never runs
//! further ahead of the workers than the queue capacity.

use crate::storage::{OrderedStore, StoreResult};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lower bound on rank keys admitted to a crawl
///
/// The skip offset is rendered as a decimal string and compared byte-wise
/// against each key, exactly as the store orders them. This is NOT a
/// numeric comparison: with a skip of `2`, the key `"10"` is excluded
/// (`"10" < "2"`) while `"3"` is admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipThreshold(String);

impl SkipThreshold {
    pub fn new(skip: u64) -> Self {
        Self(skip.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true iff `key >= threshold` under byte-wise comparison
    pub fn admits(&self, key: &str) -> bool {
        key.as_bytes() >= self.0.as_bytes()
    }
}

/// Outcome of a producer scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    /// Domains pushed onto the queue
    pub emitted: u64,

    /// Whether the scan ended early (cancellation or closed queue)
    pub stopped_early: bool,
}

/// Scans `namespace` and sends every admitted domain onto `uris`
///
/// Must be called from a blocking context (it uses `blocking_send`). The
/// scan stops early when `cancel` fires or when every receiver is gone.
/// The queue is closed by dropping the sender once the caller is done.
pub fn produce_uris<S: OrderedStore + ?Sized>(
    store: &S,
    namespace: &str,
    threshold: &SkipThreshold,
    uris: &mpsc::Sender<String>,
    cancel: &CancellationToken,
) -> StoreResult<ProducerReport> {
    let mut report = ProducerReport::default();

    store.for_each(namespace, &mut |key, domain| {
        if cancel.is_cancelled() {
            report.stopped_early = true;
            return ControlFlow::Break(());
        }
        if !threshold.admits(key) {
            return ControlFlow::Continue(());
        }
        if uris.blocking_send(domain.to_string()).is_err() {
            report.stopped_early = true;
            return ControlFlow::Break(());
        }
        report.emitted += 1;
        ControlFlow::Continue(())
    })?;

    Ok(report)
}
