//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use hooklytics_auth::TokenVerifier;
use hooklytics_core::config::AppConfig;
use hooklytics_core::traits::EventStore;
use hooklytics_ingest::{BatchWriter, EventValidator};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token verifier backed by the JWKS cache
    pub verifier: Arc<TokenVerifier>,
    /// Event payload validator
    pub validator: Arc<EventValidator>,
    /// Pending batch and store writer
    pub writer: Arc<BatchWriter>,
    /// Analytics store, for health checks
    pub store: Arc<dyn EventStore>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}
