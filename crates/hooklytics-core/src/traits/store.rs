//! Analytics store trait for pluggable event sinks.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AppError, ErrorKind};
use crate::types::EventRecord;

/// Failures reported by an [`EventStore`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("connection to analytics store failed: {0}")]
    ConnectionFailed(String),
    /// The store was reached but rejected or aborted the write.
    #[error("write to analytics store failed: {0}")]
    WriteFailed(String),
    /// The write did not complete in time.
    #[error("write to analytics store timed out after {0:?}")]
    Timeout(Duration),
    /// A record could not be encoded for the store.
    #[error("failed to encode event for storage: {0}")]
    Encoding(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::Store, message, err)
    }
}

/// A sink that appends event rows in batches.
///
/// `append_batch` is all-or-nothing: on `Err` the caller must assume none
/// of the rows are visible.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append all records as one atomic write.
    async fn append_batch(&self, records: &[EventRecord]) -> Result<(), StoreError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;

    /// Short provider name for logs and health output.
    fn provider_name(&self) -> &'static str;
}
