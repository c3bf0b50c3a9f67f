//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{HealthResponse, StoreHealth};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (reachable, error) = match state.store.health_check().await {
        Ok(ok) => (ok, None),
        Err(e) => (false, Some(e.to_string())),
    };

    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: StoreHealth {
            provider: state.store.provider_name(),
            reachable,
            error,
        },
        batch: state.writer.stats().await,
    })
}
