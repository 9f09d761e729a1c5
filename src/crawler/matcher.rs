//! Pattern matching and the per-site fetch step

use crate::config::Patterns;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use std::time::Duration;

/// A site whose body matched at least one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub url: String,
    /// Names of the matched patterns, sorted and never empty
    pub patterns: Vec<String>,
    pub title: String,
    pub description: String,
    pub language: String,
}

/// Outcome of fetching and matching a single site
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one pattern matched
    Success(CrawlResult),
    /// The page was fetched but no pattern matched; not an error
    NoMatch,
    /// The fetch itself failed
    Failure(FetchError),
}

/// Returns the names of all patterns whose substring occurs in `body`
///
/// Matching is case-sensitive byte containment. Names come out in
/// ascending order. An empty substring matches every body.
pub fn match_patterns(patterns: &Patterns, body: &[u8]) -> Vec<String> {
    patterns
        .iter()
        .filter(|(_, needle)| contains(body, needle.as_bytes()))
        .map(|(name, _)| name.to_string())
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Fetches `uri` and tests its body against `patterns`
pub async fn fetch_and_match(
    fetcher: &dyn PageFetcher,
    uri: &str,
    patterns: &Patterns,
    timeout: Duration,
) -> FetchOutcome {
    let page = match fetcher.fetch(uri, timeout).await {
        Ok(page) => page,
        Err(e) => return FetchOutcome::Failure(e),
    };

    let matched = match_patterns(patterns, &page.body);
    if matched.is_empty() {
        return FetchOutcome::NoMatch;
    }

    FetchOutcome::Success(CrawlResult {
        url: page.url,
        patterns: matched,
        title: page.title,
        description: page.description,
        language: page.language,
    })
}
