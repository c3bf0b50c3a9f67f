//! # hooklytics-ingest
//!
//! The path an event takes after authentication:
//!
//! - `validator`: turns raw JSON payloads into typed [`Event`]s or field violations
//! - `batch`: buffers validated events and appends them to the store in batches
//! - `error`: ingestion failures and their mapping into `AppError`
//!
//! [`Event`]: hooklytics_core::types::Event

pub mod batch;
pub mod error;
pub mod validator;

pub use batch::{BatchFlusher, BatchWriter, FlushReport, WriterStats};
pub use error::{FlushError, IngestError};
pub use validator::{EventValidator, ValidationError, Violation};
