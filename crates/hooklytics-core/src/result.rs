//! Convenience result type alias for Hooklytics.

use crate::error::AppError;

/// A specialized `Result` type for Hooklytics operations.
pub type AppResult<T> = Result<T, AppError>;
