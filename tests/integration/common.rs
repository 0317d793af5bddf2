//! Shared fixtures for the integration tests

use barrio_scout::config::{
    ClientConfig, ColumnMapping, Config, DispatchConfig, MatchMode, PollingConfig,
    ResultsFeedConfig,
};
use barrio_scout::geo::Coordinate;

/// Header row of the results feed used throughout the tests
pub const HEADER: &str = concat!(
    "title,address,gps_coordinates,",
    "rating,reviews,thumbnail,operating_hours,url,status"
);

/// Port 1 is never listening; requests to it fail with a connection error
pub const UNREACHABLE_TRIGGER: &str = "http://127.0.0.1:1/trigger";

/// The origin of the walkthrough scenarios (Santa Cruz de la Sierra)
pub fn origin() -> Coordinate {
    Coordinate::new(-17.6822, -63.1525).unwrap()
}

/// Builds a config pointing every endpoint at `server_uri`
pub fn test_config(server_uri: &str) -> Config {
    Config {
        client: ClientConfig {
            name: "BarrioScoutTest".to_string(),
            version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            request_timeout_ms: 2_000,
        },
        dispatch: DispatchConfig {
            trigger_url: format!("{}/trigger", server_uri),
            pending_feed_url: format!("{}/pending", server_uri),
            pending_feed_token: None,
            search_base_url: "https://maps.example.com/maps/search".to_string(),
            zoom: 14,
            require_trigger: false,
        },
        results_feed: ResultsFeedConfig {
            url: format!("{}/results.csv", server_uri),
            columns: ColumnMapping::default(),
        },
        polling: PollingConfig {
            radius_km: 1.0,
            interval_ms: 20,
            deadline_ms: 2_000,
            initial_delay_ms: 0,
            match_mode: MatchMode::Nearby,
        },
    }
}

/// One CSV row in the layout of [`HEADER`]
pub fn csv_row(title: &str, lat: f64, lng: f64, extra: &str) -> String {
    format!(
        r#"{},Av. Banzer 123,"{{""latitude"": {}, ""longitude"": {}}}",{}"#,
        title, lat, lng, extra
    )
}

/// A CSV body with the header and the given rows
pub fn csv_body(rows: &[String]) -> String {
    let mut body = HEADER.to_string();
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    body
}

/// A row with only title, address and coordinates filled in
pub fn plain_row(title: &str, lat: f64, lng: f64) -> String {
    csv_row(title, lat, lng, ",,,,,")
}
