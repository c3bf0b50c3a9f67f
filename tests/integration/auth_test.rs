//! Integration tests for bearer token authentication.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use http::StatusCode;
use serde_json::json;

use hooklytics_auth::{AuthError, KeySet, KeySetFetcher};

use helpers::{TestApp, mint_token, page_view_event};

#[derive(Debug)]
struct UnreachableIdentityProvider;

#[async_trait]
impl KeySetFetcher for UnreachableIdentityProvider {
    async fn fetch(&self, url: &str) -> Result<KeySet, AuthError> {
        Err(AuthError::KeySetUnavailable(format!("{url} returned 503")))
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected_without_touching_batch() {
    let app = TestApp::new();
    let expired = app.token(-3600);

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some(&expired))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
    assert_eq!(response.body["details"]["reason"], "TOKEN_EXPIRED");
    assert_eq!(app.writer.pending().await, 0);
    assert_eq!(app.writer.stats().await.enqueued, 0);
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["details"]["reason"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_signed_with_other_key() {
    let app = TestApp::new();
    let now = Utc::now().timestamp();
    let forged = mint_token(
        b"not-the-identity-provider-secret",
        json!({ "sub": "user_1", "exp": now + 3600 }),
    );

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some(&forged))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["details"]["reason"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_garbage_token() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some("abc.def"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_runs_before_body_parsing() {
    let app = TestApp::new();

    let response = app
        .request_raw("POST", "/api/events", "not json at all", None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unreachable_key_set_is_unauthorized() {
    let app = TestApp::with_fetcher(Arc::new(UnreachableIdentityProvider));
    let token = app.token(3600);

    let response = app
        .request("POST", "/api/events", Some(json!([page_view_event()])), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["details"]["reason"], "KEY_SET_UNAVAILABLE");
    assert_eq!(app.writer.pending().await, 0);
}

#[tokio::test]
async fn test_me_returns_verified_claims() {
    let app = TestApp::new();
    let token = app.token(3600);

    let response = app.request("GET", "/api/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], "user_1");
    assert_eq!(response.body["email"], "owner@example.com");
    assert_eq!(response.body["user_type"], "pro");
    assert!(response.body["expires_at"].is_string());
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
