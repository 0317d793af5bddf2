use crate::config::types::{
    ClientConfig, Config, DispatchConfig, MatchMode, PollingConfig, ResultsFeedConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_config(&config.client)?;
    validate_dispatch_config(&config.dispatch)?;
    validate_results_feed_config(&config.results_feed)?;
    validate_polling_config(&config.polling, &config.results_feed)?;
    Ok(())
}

/// Validates client identification
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "client name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    validate_http_url("contact-url", &config.contact_url)?;

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates dispatch endpoints and job URL layout
fn validate_dispatch_config(config: &DispatchConfig) -> Result<(), ConfigError> {
    validate_http_url("trigger-url", &config.trigger_url)?;
    validate_http_url("pending-feed-url", &config.pending_feed_url)?;
    validate_http_url("search-base-url", &config.search_base_url)?;

    if !(1..=21).contains(&config.zoom) {
        return Err(ConfigError::Validation(format!(
            "zoom must be between 1 and 21, got {}",
            config.zoom
        )));
    }

    Ok(())
}

/// Validates the results feed location and column names
fn validate_results_feed_config(config: &ResultsFeedConfig) -> Result<(), ConfigError> {
    validate_http_url("results-feed url", &config.url)?;

    let columns = &config.columns;
    for (key, value) in [
        ("coordinates-column", &columns.coordinates),
        ("title-column", &columns.title),
        ("address-column", &columns.address),
        ("rating-column", &columns.rating),
        ("reviews-column", &columns.reviews),
        ("thumbnail-column", &columns.thumbnail),
        ("hours-column", &columns.hours),
        ("job-url-column", &columns.job_url),
        ("status-column", &columns.status),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Validates polling timing and radius
fn validate_polling_config(
    config: &PollingConfig,
    feed: &ResultsFeedConfig,
) -> Result<(), ConfigError> {
    if !config.radius_km.is_finite() || config.radius_km <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "radius-km must be a positive number, got {}",
            config.radius_km
        )));
    }

    if config.interval_ms < 1 {
        return Err(ConfigError::Validation(
            "interval-ms must be >= 1".to_string(),
        ));
    }

    if config.deadline_ms < config.interval_ms {
        return Err(ConfigError::Validation(format!(
            "deadline-ms ({}) must be >= interval-ms ({})",
            config.deadline_ms, config.interval_ms
        )));
    }

    if config.initial_delay_ms >= config.deadline_ms {
        return Err(ConfigError::Validation(format!(
            "initial-delay-ms ({}) must be < deadline-ms ({})",
            config.initial_delay_ms, config.deadline_ms
        )));
    }

    if config.match_mode == MatchMode::AwaitJob && feed.columns.completed_statuses.is_empty() {
        return Err(ConfigError::Validation(
            "completed-statuses cannot be empty when match-mode is \"await-job\"".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a URL parses and uses http or https
fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    Ok(())
}
