use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::url::normalize_url;
use crate::ConfigError;

/// Upper bound on the worker pool size
const MAX_THREADS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(seed) = &config.seed {
        validate_seed(seed)?;
    }
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates that a seed is an absolute http(s) URL with a host
pub fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    normalize_url(seed)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))
}

/// Validates crawler configuration
///
/// Rejects settings that would stall or panic a crawl, such as an empty
/// worker pool or a zero monitor interval.
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth = 0 is allowed: only the seed is crawled

    if config.max_threads < 1 || config.max_threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "max_threads must be between 1 and {}, got {}",
            MAX_THREADS, config.max_threads
        )));
    }

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

    let timeouts = [
        ("connect_timeout_ms", config.connect_timeout_ms),
        ("request_timeout_ms", config.request_timeout_ms),
        ("poll_timeout_ms", config.poll_timeout_ms),
        ("monitor_interval_ms", config.monitor_interval_ms),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if matches!(config.directory.as_deref(), Some(dir) if dir.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if matches!(config.database_path.as_deref(), Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
