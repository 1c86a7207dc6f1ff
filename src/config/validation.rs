use crate::config::types::{Config, CrawlerConfig, ImagesConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use regex::RegexBuilder;
use url::Url;

/// Most high-resolution query variants the resolution ladder will try
pub const MAX_HIGH_RES_QUERIES: usize = 3;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_images_config(&config.images)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_timeout_secs == 0 || config.image_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page_timeout_secs and image_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.pause_poll_ms == 0 || config.pause_poll_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "pause_poll_ms must be between 1 and 10000, got {}",
            config.pause_poll_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates image heuristics
fn validate_images_config(config: &ImagesConfig) -> Result<(), ConfigError> {
    RegexBuilder::new(&config.icon_pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern(format!("icon_pattern: {}", e)))?;

    if config.high_res_queries.len() > MAX_HIGH_RES_QUERIES {
        return Err(ConfigError::Validation(format!(
            "high_res_queries allows at most {} entries, got {}",
            MAX_HIGH_RES_QUERIES,
            config.high_res_queries.len()
        )));
    }

    for query in &config.high_res_queries {
        if query.is_empty() || query.starts_with('?') || query.contains('#') {
            return Err(ConfigError::Validation(format!(
                "high_res_queries entries must be bare query strings like 'w=2048', got '{}'",
                query
            )));
        }
    }

    Ok(())
}
