//! Authentication failures.

use thiserror::Error;

use hooklytics_core::error::{AppError, ErrorKind};

/// Why a bearer token was not accepted.
///
/// All variants are the caller's problem from the ingestion endpoint's
/// point of view and are never retried inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The identity provider's key set could not be obtained.
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),
    /// The token is malformed, its signature is wrong, or its claims do not decode.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// The token's `exp` claim has passed.
    #[error("token has expired")]
    TokenExpired,
}

impl AuthError {
    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeySetUnavailable(_) => "KEY_SET_UNAVAILABLE",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        AppError::new(ErrorKind::Authentication, format!("Unauthorized: {err}"))
            .with_details(serde_json::json!({ "reason": code }))
    }
}
