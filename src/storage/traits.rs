//! Storage traits and error types
//!
//! This module defines the read interface the crawler needs from the
//! ranked domain store, and associated error types.

use std::ops::ControlFlow;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid namespace name: {0:?}")]
    InvalidNamespace(String),

    #[error("no such bucket: {0}")]
    MissingNamespace(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only, key-ordered mapping of rank keys to domain names
///
/// Keys are strings and are always iterated in ascending byte-wise order.
/// For decimal rank keys this is NOT numeric order: `"10"` sorts before
/// `"2"`.
pub trait OrderedStore {
    /// Returns whether the namespace exists
    fn has_namespace(&self, namespace: &str) -> StoreResult<bool>;

    /// Visits every `(key, value)` pair of a namespace in ascending key order
    ///
    /// Iteration stops early when `visit` returns [`ControlFlow::Break`].
    /// Fails with [`StoreError::MissingNamespace`] if the namespace is absent.
    fn for_each(
        &self,
        namespace: &str,
        visit: &mut dyn FnMut(&str, &str) -> ControlFlow<()>,
    ) -> StoreResult<()>;

    /// Counts the keys that compare byte-wise greater than or equal to `threshold`
    fn count_from(&self, namespace: &str, threshold: &str) -> StoreResult<u64>;
}
