//! Ingestion failures.

use thiserror::Error;

use hooklytics_core::error::AppError;
use hooklytics_core::traits::StoreError;

use crate::validator::Violation;

/// Why a request's events were not accepted.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    /// At least one event failed validation; nothing was enqueued.
    #[error("{} violation(s) in submitted events", .0.len())]
    Validation(Vec<Violation>),
    /// The request carries more events than allowed.
    #[error("request contains {count} events, the limit is {max}")]
    TooManyEvents { count: usize, max: usize },
    /// Accepting the events would exceed the pending limit.
    #[error("event buffer is full ({pending} pending, limit {capacity})")]
    BufferFull { pending: usize, capacity: usize },
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(violations) => {
                let message = format!("{} event field(s) failed validation", violations.len());
                AppError::validation(message)
                    .with_details(serde_json::json!({ "violations": violations }))
            }
            other @ IngestError::TooManyEvents { .. } => AppError::bad_request(other.to_string()),
            other @ IngestError::BufferFull { .. } => {
                AppError::service_unavailable(format!("{other}, retry later"))
            }
        }
    }
}

/// A batch that could not be written even after a retry.
#[derive(Debug, Clone, Error)]
#[error("flush failed, {lost} event(s) dropped: {source}")]
pub struct FlushError {
    /// Events discarded with the batch.
    pub lost: usize,
    /// The error of the last attempt.
    #[source]
    pub source: StoreError,
}
