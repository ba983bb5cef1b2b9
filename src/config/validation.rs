use crate::config::types::{BrowseConfig, Config, EndpointConfig, HttpConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_endpoints(&config.endpoints)?;
    validate_search_config(&config.search)?;
    validate_browse_config(&config.browse)?;
    Ok(())
}

/// Validates HTTP transport settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be at most 10, got {}",
            config.max_retries
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every endpoint is an absolute http(s) URL
fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    for (key, value) in config.entries() {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                key, value
            )));
        }
    }

    Ok(())
}

/// Validates search defaults
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_results == 0 {
        return Err(ConfigError::Validation(
            "max-results must be at least 1".to_string(),
        ));
    }

    if config.max_display == 0 {
        return Err(ConfigError::Validation(
            "max-display must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates browse defaults
fn validate_browse_config(config: &BrowseConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 200 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 200, got {}",
            config.max_pages
        )));
    }

    if config.max_page_number < 1 {
        return Err(ConfigError::Validation(
            "max-page-number must be at least 1".to_string(),
        ));
    }

    Ok(())
}
