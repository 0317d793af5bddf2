//! Barrio Scout: nearby small-business discovery
//!
//! This crate dispatches an external scrape job for a business type around a
//! point, polls the shared results feed until rows near that point appear (or
//! a deadline passes), and filters and scores what it finds.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod feed;
pub mod geo;
pub mod http;
pub mod output;
pub mod scoring;

use thiserror::Error;

/// Main error type for Barrio Scout construction and CLI operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid coordinate: {0}")]
    Geo(#[from] geo::GeoError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] discovery::DiscoveryError),

    #[error("Results feed error: {0}")]
    Feed(#[from] feed::SourceUnavailable),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Barrio Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{DiscoveryOutcome, DiscoveryReport, PollingCoordinator};
pub use feed::CandidateRecord;
pub use geo::{distance_km, Coordinate};
pub use scoring::score;
