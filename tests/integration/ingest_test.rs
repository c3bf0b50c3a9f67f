//! Integration tests for the event ingestion endpoint.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, page_view_event, test_config};

#[tokio::test]
async fn test_valid_event_is_accepted_and_stored() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "accepted": 1 }));
    assert_eq!(app.writer.pending().await, 1);

    app.writer.flush().await.expect("flush failed");

    let rows = app.store.records().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].hook_type, "track_duration");
    assert_eq!(rows[0].event_type, "page_view");
    assert_eq!(rows[0].timestamp.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(rows[0].element_metadata, "{}");

    let core: serde_json::Value = serde_json::from_str(&rows[0].core_metadata).unwrap();
    assert_eq!(core, json!({ "duration_ms": 5400 }));
}

#[tokio::test]
async fn test_root_events_path_is_routed() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app
        .request("POST", "/events", Some(json!([page_view_event(), page_view_event()])), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["accepted"], 2);
}

#[tokio::test]
async fn test_empty_array_accepts_nothing() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app
        .request("POST", "/api/events", Some(json!([])), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["accepted"], 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app
        .request_raw("POST", "/api/events", "[{\"user_id\": ", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_non_array_body_is_bad_request() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app
        .request("POST", "/api/events", Some(page_view_event()), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.writer.pending().await, 0);
}

#[tokio::test]
async fn test_one_invalid_event_rejects_the_whole_request() {
    let app = TestApp::new();
    let token = app.token(3600);

    let mut broken = page_view_event();
    broken.as_object_mut().unwrap().remove("website_id");

    let response = app
        .request(
            "POST",
            "/api/events",
            Some(json!([page_view_event(), broken])),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let violations = response.body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["index"], 1);
    assert_eq!(violations[0]["field"], "website_id");
    assert_eq!(violations[0]["code"], "MISSING_FIELD");

    assert_eq!(app.writer.pending().await, 0);
}

#[tokio::test]
async fn test_unknown_hook_type_is_reported() {
    let app = TestApp::new();
    let token = app.token(3600);

    let mut event = page_view_event();
    event["hook_type"] = json!("track_scroll_depth");

    let response = app
        .request("POST", "/api/events", Some(json!([event])), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["violations"][0]["code"], "UNKNOWN_HOOK_TYPE");
}

#[tokio::test]
async fn test_too_many_events_is_bad_request() {
    let mut config = test_config();
    config.ingest.max_events_per_request = 2;
    let app = TestApp::with_config(config);
    let token = app.token(3600);

    let events = json!([page_view_event(), page_view_event(), page_view_event()]);
    let response = app
        .request("POST", "/api/events", Some(events), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.writer.pending().await, 0);
}

#[tokio::test]
async fn test_full_buffer_returns_service_unavailable() {
    let mut config = test_config();
    config.batch.max_size = 2;
    config.batch.max_pending = 2;
    let app = TestApp::with_config(config);
    let token = app.token(3600);

    let first = app
        .request("POST", "/api/events", Some(json!([page_view_event(), page_view_event()])), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(second.body["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(app.writer.pending().await, 2);
}

#[tokio::test]
async fn test_health_reports_store_and_batch() {
    let app = TestApp::new();
    let token = app.token(3600);

    app.request("POST", "/api/events", Some(json!([page_view_event()])), Some(&token))
        .await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"]["provider"], "memory");
    assert_eq!(response.body["store"]["reachable"], true);
    assert_eq!(response.body["batch"]["pending"], 1);
    assert_eq!(response.body["batch"]["enqueued"], 1);
}

#[tokio::test]
async fn test_health_is_degraded_when_store_is_down() {
    let app = TestApp::new();
    app.store.set_healthy(false);

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["store"]["reachable"], false);
}

#[tokio::test]
async fn test_unknown_route_returns_json_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/unknown", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let response = app.request("GET", "/nothing-here", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}
