//! Field-level validation failures.

use serde::Serialize;
use thiserror::Error;

/// Why a single field of an event payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent, null, or blank.
    #[error("'{0}' is required")]
    MissingField(String),
    /// `hook_type` is not one of the known hooks.
    #[error("unknown hook type '{0}'")]
    UnknownHookType(String),
    /// The timestamp is not positive or lies too far in the future.
    #[error("{0}")]
    InvalidTimestamp(String),
    /// The field holds the wrong JSON type.
    #[error("'{field}' must be {expected}")]
    InvalidType { field: String, expected: &'static str },
}

impl ValidationError {
    /// Machine-readable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::UnknownHookType(_) => "UNKNOWN_HOOK_TYPE",
            Self::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            Self::InvalidType { .. } => "INVALID_TYPE",
        }
    }
}

/// One rejected field of one event in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Position of the event in the request array.
    pub index: usize,
    /// Wire name of the offending field.
    pub field: String,
    /// See [`ValidationError::code`].
    pub code: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(index: usize, field: impl Into<String>, error: &ValidationError) -> Self {
        Self {
            index,
            field: field.into(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}
