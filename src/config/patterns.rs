//! Named substring patterns
//!
//! Patterns are kept in a sorted map so that matching visits them in name
//! order and matched names come out in a reproducible order.

use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping of pattern name to the substring searched for in page bodies
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Patterns(BTreeMap<String, String>);

impl Patterns {
    /// Creates an empty pattern set
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates `(name, needle)` pairs in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, needle)| (name.as_str(), needle.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Patterns {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, needle)| (name.into(), needle.into()))
                .collect(),
        )
    }
}

/// Parses a JSON object of `name -> substring` pairs
pub fn parse_patterns(content: &str) -> Result<Patterns, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Loads the pattern file, degrading to an empty set on failure
///
/// A missing or malformed file is not fatal: the failure is logged as a
/// warning and the crawl proceeds with no patterns, which makes every
/// fetched site a no-match.
pub fn load_patterns(path: &Path) -> Patterns {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read patterns from {}: {}", path.display(), e);
            return Patterns::new();
        }
    };

    match parse_patterns(&content) {
        Ok(patterns) => patterns,
        Err(e) => {
            tracing::warn!("Error loading patterns from {}: {}", path.display(), e);
            Patterns::new()
        }
    }
}
