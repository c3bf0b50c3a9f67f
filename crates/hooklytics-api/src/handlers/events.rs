//! Event ingestion handler.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;
use tracing::{debug, info};

use hooklytics_core::error::AppError;
use hooklytics_ingest::IngestError;

use crate::dto::response::IngestResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/events
///
/// Accepts a JSON array of events. The request is all-or-nothing: if any
/// event is invalid nothing is enqueued and every violation is returned.
pub async fn ingest_events(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Malformed JSON body: {e}")))?;

    let Value::Array(payloads) = payload else {
        return Err(AppError::bad_request("Request body must be a JSON array of events").into());
    };

    let max = state.validator.max_events_per_request();
    if payloads.len() > max {
        return Err(IngestError::TooManyEvents {
            count: payloads.len(),
            max,
        }
        .into());
    }

    let events = state.validator.validate_all(&payloads).map_err(|violations| {
        debug!(
            user = %auth.subject_id(),
            violations = violations.len(),
            "Rejected event payloads"
        );
        IngestError::Validation(violations)
    })?;

    let accepted = state.writer.enqueue(events).await?;

    info!(user = %auth.subject_id(), accepted, "Events accepted");
    Ok(Json(IngestResponse { accepted }))
}
