//! Shared HTTP client construction
//!
//! One client is built per process and cloned into the dispatcher and the
//! results store; `reqwest::Client` clones share the connection pool.

use crate::config::ClientConfig;
use reqwest::Client;
use std::time::Duration;

/// Formats the User-Agent header value
///
/// Format: `Name/Version (+ContactURL)`
pub fn user_agent(config: &ClientConfig) -> String {
    format!("{}/{} (+{})", config.name, config.version, config.contact_url)
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use barrio_scout::config::ClientConfig;
/// use barrio_scout::http::build_http_client;
///
/// let config = ClientConfig {
///     name: "barrio-scout".to_string(),
///     version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     request_timeout_ms: 15_000,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(config.request_timeout_ms);

    Client::builder()
        .user_agent(user_agent(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}
