use crate::config::types::Settings;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a settings file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully parsed settings, not yet validated
/// * `Err(ConfigError)` - Failed to load or parse the settings
///
/// Validation is left to the caller so that command-line overrides can be
/// merged in first.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use rankcrawl::config::load_settings;
///
/// let settings = load_settings(Path::new("crawl.toml")).unwrap();
/// println!("Jobs: {}", settings.crawler.jobs);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let settings: Settings = toml::from_str(&content)?;

    Ok(settings)
}

/// Computes a SHA-256 hash of a file's content
///
/// Used to record which settings and pattern files a run was started with.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_file_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads settings and returns both the settings and the file hash
pub fn load_settings_with_hash(path: &Path) -> Result<(Settings, String), ConfigError> {
    let settings = load_settings(path)?;
    let hash = compute_file_hash(path)?;
    Ok((settings, hash))
}
