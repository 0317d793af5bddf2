use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Fixed tail of every job URL path: list view of search results
const RESULT_LIST_SEGMENT: &str = "data=!4m2!2m1!6e6";

/// A dispatched scrape request
///
/// Created once per discovery session and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeJob {
    pub business_type: String,
    pub origin: Coordinate,
    pub dispatched_at: DateTime<Utc>,

    /// Deterministic encoding of (business type, origin); result rows carry it
    /// back so they can be correlated with this job
    pub job_url: String,

    /// Whether the worker trigger was acknowledged
    pub trigger_delivered: bool,
}

/// Builds the job URL for a business type around a point
///
/// The same inputs always produce the same URL, e.g.
/// `https://www.google.com/maps/search/cafe/@-17.6822,-63.1525,14z/data=!4m2!2m1!6e6?entry=ttu`.
/// The business type is percent-encoded as a single path segment.
pub fn build_job_url(
    search_base_url: &str,
    business_type: &str,
    origin: Coordinate,
    zoom: u8,
) -> Result<String, String> {
    let mut url = Url::parse(search_base_url)
        .map_err(|e| format!("invalid search base URL '{}': {}", search_base_url, e))?;

    url.path_segments_mut()
        .map_err(|_| format!("search base URL '{}' cannot take a path", search_base_url))?
        .pop_if_empty()
        .push(business_type.trim())
        .push(&format!(
            "@{},{},{}z",
            origin.latitude(),
            origin.longitude(),
            zoom
        ))
        .push(RESULT_LIST_SEGMENT);
    url.set_query(Some("entry=ttu"));

    Ok(url.to_string())
}
