//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::Utc;
use http::{Request, StatusCode};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use hooklytics_auth::{KeySetFetcher, StaticKeySetFetcher};
use hooklytics_core::config::AppConfig;
use hooklytics_ingest::BatchWriter;
use hooklytics_store::memory::MemoryEventStore;

/// HS256 secret shared by the test key set and minted tokens.
pub const SIGNING_SECRET: &[u8] = b"hooklytics-test-signing-secret-01234567";
/// `kid` of the test key.
pub const KEY_ID: &str = "test-key-1";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// In-memory store behind the batch writer
    pub store: MemoryEventStore,
    /// The batch writer, for flushing and inspecting pending events
    pub writer: Arc<BatchWriter>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application whose key set holds the test key
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let fetcher = StaticKeySetFetcher::from_secret(Some(KEY_ID.to_string()), SIGNING_SECRET);
        Self::build(config, Arc::new(fetcher))
    }

    /// Create a test application with a custom key set source
    pub fn with_fetcher(fetcher: Arc<dyn KeySetFetcher>) -> Self {
        Self::build(test_config(), fetcher)
    }

    fn build(config: AppConfig, fetcher: Arc<dyn KeySetFetcher>) -> Self {
        let store = MemoryEventStore::new();
        let pipeline =
            hooklytics_api::build_pipeline(config.clone(), Arc::new(store.clone()), fetcher);
        let writer = Arc::clone(&pipeline.state.writer);
        let router = hooklytics_api::build_router(pipeline.state);

        Self {
            router,
            store,
            writer,
            config,
        }
    }

    /// A token for `user_1` expiring `exp_offset` seconds from now
    pub fn token(&self, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        mint_token(
            SIGNING_SECRET,
            json!({
                "sub": "user_1",
                "id": "user_1",
                "email": "owner@example.com",
                "userType": "pro",
                "iat": now,
                "exp": now + exp_offset,
            }),
        )
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.request_raw(method, path, body_str, token).await
    }

    /// Make an HTTP request with a verbatim body
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: impl Into<String>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body.into()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Configuration with an in-memory store and no automatic flushing
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.provider = "memory".to_string();
    config.auth.jwks_url = "http://identity.test/api/auth/jwks".to_string();
    config.batch.max_size = 10_000;
    config.batch.max_pending = 10_000;
    config.batch.flush_interval_ms = 3_600_000;
    config.batch.retry_backoff_ms = 10;
    config
}

/// Sign `claims` with HS256 under the test `kid`
pub fn mint_token(secret: &[u8], claims: Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KEY_ID.to_string());
    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(secret))
        .expect("Failed to sign token")
}

/// A payload the validator accepts
pub fn page_view_event() -> Value {
    json!({
        "user_id": "user_1",
        "website_id": "site_1",
        "hook_type": "track_duration",
        "event_type": "page_view",
        "default_metadata": { "path": "/pricing", "referrer": "https://news.example" },
        "core_metadata": { "duration_ms": 5400 },
        "timestamp": 1_700_000_000_000i64
    })
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
