//! Textual result record format
//!
//! ```text
//! URL: <url>
//! Patterns: <name>, <name>
//! Title: <title>
//! Description: <description>
//! Language: <LANGUAGE>
//! ===========================================================
//!
//! ```

use crate::crawler::CrawlResult;
use std::io::Write;

/// Separator line closing every record
pub const RECORD_SEPARATOR: &str = "===========================================================";

/// Formats a result as one output record, including the trailing blank line
pub fn format_record(result: &CrawlResult) -> String {
    format!(
        "URL: {}\nPatterns: {}\nTitle: {}\nDescription: {}\nLanguage: {}\n{}\n\n",
        result.url,
        result.patterns.join(", "),
        result.title,
        result.description,
        result.language.to_uppercase(),
        RECORD_SEPARATOR
    )
}

/// Writes one record and flushes the writer
pub fn write_record<W: Write>(writer: &mut W, result: &CrawlResult) -> std::io::Result<()> {
    writer.write_all(format_record(result).as_bytes())?;
    writer.flush()
}
