//! # hooklytics-api
//!
//! HTTP API layer for Hooklytics built on Axum.
//!
//! Provides the ingestion, claims, and health endpoints, the bearer token
//! extractor, middleware (CORS, compression, request logging), and the
//! mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Pipeline, build_pipeline};
pub use router::build_router;
pub use state::AppState;
