use crate::config::types::{CrawlConfig, FetcherConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Largest accepted backoff multiplier or cap, in seconds
pub const MAX_BACKOFF_S: f64 = 3600.0;

/// Validates the entire run configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher tuning
pub fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be > 0".to_string(),
        ));
    }

    if !(0.0..1.0).contains(&config.jitter_ratio) {
        return Err(ConfigError::Validation(format!(
            "jitter_ratio must be in [0, 1), got {}",
            config.jitter_ratio
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    for (name, value) in [
        ("backoff_multiplier_s", config.backoff_multiplier_s),
        ("backoff_max_s", config.backoff_max_s),
    ] {
        if !value.is_finite() || !(0.0..=MAX_BACKOFF_S).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 0 and {} seconds, got {}",
                name, MAX_BACKOFF_S, value
            )));
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_start_url(url: &Url) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use http or https",
            url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' has no host",
            url
        )));
    }

    Ok(())
}
