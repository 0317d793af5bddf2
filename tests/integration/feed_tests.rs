//! Results feed snapshots over HTTP

use crate::common::{csv_body, csv_row, plain_row, test_config};
use barrio_scout::feed::{HttpResultStore, OperatingHours, ResultStore, SourceUnavailable};
use barrio_scout::http::build_http_client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn store_for(mock_server: &MockServer) -> HttpResultStore {
    let config = test_config(&mock_server.uri());
    let client = build_http_client(&config.client).unwrap();
    HttpResultStore::new(client, &config.results_feed)
}

#[tokio::test]
async fn test_snapshot_parses_typed_records() {
    let mock_server = MockServer::start().await;

    let body = csv_body(&[csv_row(
        "Panaderia Lupita",
        -17.6825,
        -63.1528,
        concat!(
            r#"4.5,"1,234",https://img.example.com/a.jpg,"#,
            r#""{""mon"": ""9-5""}",https://maps.example.com/job,done"#
        ),
    )]);

    Mock::given(method("GET"))
        .and(path("/results.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let snapshot = store_for(&mock_server).await.snapshot().await.unwrap();

    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.skipped_rows, 0);

    let record = &snapshot.records[0];
    assert_eq!(record.title.as_deref(), Some("Panaderia Lupita"));
    assert_eq!(record.address.as_deref(), Some("Av. Banzer 123"));
    assert_eq!(record.coordinates.latitude(), -17.6825);
    assert_eq!(record.coordinates.longitude(), -63.1528);
    assert_eq!(record.rating, Some(4.5));
    assert_eq!(record.review_count, Some(1234));
    assert!(matches!(
        record.operating_hours,
        Some(OperatingHours::Structured(_))
    ));
    assert_eq!(record.job_url.as_deref(), Some("https://maps.example.com/job"));
    assert_eq!(record.status.as_deref(), Some("done"));
    assert_eq!(record.score_normalized, None);
}

#[tokio::test]
async fn test_snapshot_skips_malformed_rows() {
    let mock_server = MockServer::start().await;

    let body = csv_body(&[
        plain_row("Good", -17.6825, -63.1528),
        "No Coordinates,Somewhere,,,,,,,".to_string(),
        r#"Bad Coordinates,Somewhere,"{""latitude"": ""north""}",,,,,,"#.to_string(),
        plain_row("Also Good", -17.7000, -63.1600),
    ]);

    Mock::given(method("GET"))
        .and(path("/results.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let snapshot = store_for(&mock_server).await.snapshot().await.unwrap();

    let titles: Vec<_> = snapshot
        .records
        .iter()
        .map(|r| r.title.clone().unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["Good", "Also Good"]);
    assert_eq!(snapshot.skipped_rows, 2);
}

#[tokio::test]
async fn test_snapshot_of_empty_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/results.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(csv_body(&[])))
        .mount(&mock_server)
        .await;

    let snapshot = store_for(&mock_server).await.snapshot().await.unwrap();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.skipped_rows, 0);
}

#[tokio::test]
async fn test_snapshot_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/results.csv"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = store_for(&mock_server).await.snapshot().await;
    assert!(matches!(result, Err(SourceUnavailable::Status(503))));
}

#[tokio::test]
async fn test_snapshot_rejects_non_utf8_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/results.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0x00, 0x41]))
        .mount(&mock_server)
        .await;

    let result = store_for(&mock_server).await.snapshot().await;
    assert!(matches!(result, Err(SourceUnavailable::Parse(_))));
}
