//! Rank list import
//!
//! Parses `rank,domain` lines as published by the top-sites rankings.

/// Counters from importing a rank list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records written to the store
    pub imported: u64,

    /// Non-blank lines that were not a valid `rank,domain` pair
    pub skipped: u64,
}

/// Parses one `rank,domain` line
///
/// Returns `None` for lines without a decimal rank or without a domain,
/// which also covers header rows such as `rank,domain`. The rank is
/// returned exactly as written so it becomes the store key unchanged.
pub fn parse_rank_line(line: &str) -> Option<(&str, &str)> {
    let (rank, domain) = line.trim().split_once(',')?;
    let rank = rank.trim();
    let domain = domain.trim();

    if rank.is_empty() || !rank.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if domain.is_empty() {
        return None;
    }

    Some((rank, domain))
}
