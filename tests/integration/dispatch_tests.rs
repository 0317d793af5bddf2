//! Dispatch against mocked pending-work feed and trigger endpoints

use crate::common::{origin, test_config, UNREACHABLE_TRIGGER};
use barrio_scout::dispatch::{DispatchError, Dispatcher, HttpDispatcher};
use barrio_scout::http::build_http_client;
use chrono::Utc;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_dispatch_appends_job_row_and_triggers() {
    let mock_server = MockServer::start().await;
    let mut config = test_config(&mock_server.uri());
    config.dispatch.pending_feed_token = Some("s3cret".to_string());

    let expected_url = concat!(
        "https://maps.example.com/maps/search/panaderia/",
        "@-17.6822,-63.1525,14z/data=!4m2!2m1!6e6?entry=ttu"
    );

    Mock::given(method("POST"))
        .and(path("/pending"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_json(json!({ "values": [[expected_url, ""]] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let job = dispatcher.dispatch("panaderia", origin()).await.unwrap();

    assert_eq!(job.job_url, expected_url);
    assert_eq!(job.business_type, "panaderia");
    assert_eq!(job.origin, origin());
    assert!(job.trigger_delivered);
}

#[tokio::test]
async fn test_dispatch_same_inputs_same_job_url() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let first = dispatcher.dispatch("cafe", origin()).await.unwrap();
    let second = dispatcher.dispatch("cafe", origin()).await.unwrap();

    assert_eq!(first.job_url, second.job_url);
}

#[tokio::test]
async fn test_trigger_failure_is_tolerated_by_default() {
    let mock_server = MockServer::start().await;
    let mut config = test_config(&mock_server.uri());
    config.dispatch.trigger_url = UNREACHABLE_TRIGGER.to_string();

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let job = dispatcher.dispatch("cafe", origin()).await.unwrap();
    assert!(!job.trigger_delivered);
}

#[tokio::test]
async fn test_trigger_error_status_counts_as_delivered() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let job = dispatcher.dispatch("cafe", origin()).await.unwrap();
    assert!(job.trigger_delivered);
}

#[tokio::test]
async fn test_required_trigger_failure_fails_dispatch() {
    let mock_server = MockServer::start().await;
    let mut config = test_config(&mock_server.uri());
    config.dispatch.trigger_url = UNREACHABLE_TRIGGER.to_string();
    config.dispatch.require_trigger = true;

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let result = dispatcher.dispatch("cafe", origin()).await;
    assert!(matches!(result, Err(DispatchError::Trigger(_))));
}

#[tokio::test]
async fn test_pending_feed_rejection_fails_dispatch_without_trigger() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let result = dispatcher.dispatch("cafe", origin()).await;
    assert!(matches!(result, Err(DispatchError::PendingFeedStatus(403))));
}

#[tokio::test]
async fn test_empty_business_type_is_rejected_before_any_request() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let result = dispatcher.dispatch("   ", origin()).await;
    assert!(matches!(result, Err(DispatchError::InvalidJob(_))));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/pending"))
        .and(header(
            "user-agent",
            "BarrioScoutTest/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    dispatcher.dispatch("cafe", origin()).await.unwrap();
}

#[tokio::test]
async fn test_dispatched_at_is_taken_before_the_round_trips() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/pending"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trigger"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&config.client).unwrap();
    let dispatcher = HttpDispatcher::new(client, config.dispatch.clone());

    let before = Utc::now();
    let job = dispatcher.dispatch("cafe", origin()).await.unwrap();
    let after = Utc::now();

    assert!(job.dispatched_at >= before);
    assert!(job.dispatched_at - before < chrono::Duration::milliseconds(200));
    assert!(after - job.dispatched_at >= chrono::Duration::milliseconds(500));
}
