//! Output module for crawl results
//!
//! This module handles:
//! - The textual record format written for every matching site
//! - The result and error sinks draining the worker pool
//! - The summary reported at the end of a run

mod record;
mod sink;
mod summary;

pub use record::{format_record, write_record, RECORD_SEPARATOR};
pub use sink::{spawn_error_sink, spawn_result_sink, ErrorCounter};
pub use summary::{CrawlSummary, RunStatus};

use std::fs::{File, OpenOptions};
use std::path::Path;

/// Opens the results file for appending, creating it if needed
pub fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
