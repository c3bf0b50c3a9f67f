//! Route definitions for the Hooklytics HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Uri,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use hooklytics_core::error::AppError;

use crate::error::ApiError;
use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(event_routes())
        .merge(identity_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/events", post(handlers::events::ingest_events))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(middleware::compression::build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Event ingestion
fn event_routes() -> Router<AppState> {
    Router::new().route("/events", post(handlers::events::ingest_events))
}

/// Caller identity
fn identity_routes() -> Router<AppState> {
    Router::new().route("/me", get(handlers::me::me))
}

/// Liveness and pipeline state
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

async fn route_not_found(uri: Uri) -> ApiError {
    AppError::not_found(format!("No route for {}", uri.path())).into()
}
