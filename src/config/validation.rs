use crate::config::types::{
    CrawlerSettings, InputSettings, OutputSettings, Settings, UserAgentSettings, MAX_JOBS,
};
use crate::ConfigError;

/// Validates the entire settings structure
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_settings(&settings.crawler)?;
    validate_user_agent_settings(&settings.user_agent)?;
    validate_input_settings(&settings.input)?;
    validate_output_settings(&settings.output)?;
    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    if settings.jobs < 1 || settings.jobs > MAX_JOBS {
        return Err(ConfigError::Validation(format!(
            "invalid threads number, jobs must be between 1 and {}, got {}",
            MAX_JOBS, settings.jobs
        )));
    }

    if settings.level < 1 || settings.level > 3 {
        return Err(ConfigError::Validation(format!(
            "invalid deepness level, level must be between 1 and 3, got {}",
            settings.level
        )));
    }

    if settings.queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "queue_capacity must be >= 1".to_string(),
        ));
    }

    if settings.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent settings
fn validate_user_agent_settings(settings: &UserAgentSettings) -> Result<(), ConfigError> {
    if settings.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !settings
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            settings.crawler_name
        )));
    }

    if settings.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_input_settings(settings: &InputSettings) -> Result<(), ConfigError> {
    if settings.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if settings.patterns_path.is_empty() {
        return Err(ConfigError::Validation(
            "patterns_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_settings(settings: &OutputSettings) -> Result<(), ConfigError> {
    if settings.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
