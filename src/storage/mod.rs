//! Storage module for the ranked domain list
//!
//! This module handles the persisted, rank-ordered list of domains the
//! crawler walks, including:
//! - The read-only [`OrderedStore`] interface used by the crawl producer
//! - A SQLite-backed implementation where each namespace is a table
//! - Importing a `rank,domain` CSV into the store

mod import;
mod schema;
mod sqlite;
mod traits;

pub use import::{parse_rank_line, ImportReport};
pub use sqlite::SqliteStore;
pub use traits::{OrderedStore, StoreError, StoreResult};

use std::path::Path;

/// Namespace holding the `rank -> domain` records
pub const SITES_NAMESPACE: &str = "sites";

/// Opens an existing store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened store
/// * `Err(StoreError)` - Failed to open the database
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::open(path)
}
