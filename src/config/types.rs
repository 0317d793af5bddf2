use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Barrio Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub dispatch: DispatchConfig,
    #[serde(rename = "results-feed")]
    pub results_feed: ResultsFeedConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// HTTP client identification and limits
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Product token sent in the User-Agent header
    pub name: String,

    /// Version sent in the User-Agent header
    pub version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Where and how scrape jobs are registered and triggered
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Endpoint hit with a bare GET to wake the external worker
    #[serde(rename = "trigger-url")]
    pub trigger_url: String,

    /// Endpoint that appends one row to the pending-work feed
    #[serde(rename = "pending-feed-url")]
    pub pending_feed_url: String,

    /// Optional bearer token for the pending-work feed
    #[serde(rename = "pending-feed-token", default)]
    pub pending_feed_token: Option<String>,

    /// Prefix of every job URL
    #[serde(rename = "search-base-url", default = "default_search_base_url")]
    pub search_base_url: String,

    /// Map zoom level encoded in the job URL
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Fail the dispatch when the trigger cannot be delivered
    #[serde(rename = "require-trigger", default)]
    pub require_trigger: bool,
}

/// Location and column layout of the shared results feed
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsFeedConfig {
    /// CSV export URL of the results feed
    pub url: String,

    #[serde(flatten)]
    pub columns: ColumnMapping,
}

/// Names of the results-feed columns the core interprets
///
/// Every other column is carried through verbatim.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    #[serde(rename = "coordinates-column", default = "default_coordinates_column")]
    pub coordinates: String,

    #[serde(rename = "title-column", default = "default_title_column")]
    pub title: String,

    #[serde(rename = "address-column", default = "default_address_column")]
    pub address: String,

    #[serde(rename = "rating-column", default = "default_rating_column")]
    pub rating: String,

    #[serde(rename = "reviews-column", default = "default_reviews_column")]
    pub reviews: String,

    #[serde(rename = "thumbnail-column", default = "default_thumbnail_column")]
    pub thumbnail: String,

    #[serde(rename = "hours-column", default = "default_hours_column")]
    pub hours: String,

    #[serde(rename = "job-url-column", default = "default_job_url_column")]
    pub job_url: String,

    #[serde(rename = "status-column", default = "default_status_column")]
    pub status: String,

    /// Status values (case-insensitive) that mark a job's rows as complete
    #[serde(rename = "completed-statuses", default = "default_completed_statuses")]
    pub completed_statuses: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            coordinates: default_coordinates_column(),
            title: default_title_column(),
            address: default_address_column(),
            rating: default_rating_column(),
            reviews: default_reviews_column(),
            thumbnail: default_thumbnail_column(),
            hours: default_hours_column(),
            job_url: default_job_url_column(),
            status: default_status_column(),
            completed_statuses: default_completed_statuses(),
        }
    }
}

/// How a discovery session decides a row qualifies
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Any row within the radius qualifies
    #[default]
    Nearby,

    /// Rows must also belong to the dispatched job and report completion
    AwaitJob,
}

/// Polling loop timing and filtering
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Maximum distance from the origin (kilometers)
    #[serde(rename = "radius-km", default = "default_radius_km")]
    pub radius_km: f64,

    /// Pause between snapshots (milliseconds)
    #[serde(rename = "interval-ms", default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Wall-clock budget for one session (milliseconds)
    #[serde(rename = "deadline-ms", default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Wait before the first snapshot (milliseconds)
    #[serde(rename = "initial-delay-ms", default)]
    pub initial_delay_ms: u64,

    #[serde(rename = "match-mode", default)]
    pub match_mode: MatchMode,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            interval_ms: default_interval_ms(),
            deadline_ms: default_deadline_ms(),
            initial_delay_ms: 0,
            match_mode: MatchMode::default(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_search_base_url() -> String {
    "https://www.google.com/maps/search".to_string()
}

fn default_zoom() -> u8 {
    14
}

fn default_coordinates_column() -> String {
    "gps_coordinates".to_string()
}

fn default_title_column() -> String {
    "title".to_string()
}

fn default_address_column() -> String {
    "address".to_string()
}

fn default_rating_column() -> String {
    "rating".to_string()
}

fn default_reviews_column() -> String {
    "reviews".to_string()
}

fn default_thumbnail_column() -> String {
    "thumbnail".to_string()
}

fn default_hours_column() -> String {
    "operating_hours".to_string()
}

fn default_job_url_column() -> String {
    "url".to_string()
}

fn default_status_column() -> String {
    "status".to_string()
}

fn default_completed_statuses() -> Vec<String> {
    ["done", "completed", "finished", "success"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_radius_km() -> f64 {
    1.0
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_deadline_ms() -> u64 {
    30_000
}
