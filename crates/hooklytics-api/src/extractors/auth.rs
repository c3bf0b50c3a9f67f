//! `AuthUser` extractor: pulls the bearer token from the Authorization header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::{debug, warn};

use hooklytics_auth::{AuthError, TokenClaims};

use crate::error::ApiError;
use crate::state::AppState;

/// Verified claims of the caller, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenClaims);

impl AuthUser {
    /// Returns the inner claims.
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = TokenClaims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    debug!(%rejection, "Missing or malformed Authorization header");
                    AuthError::InvalidToken("missing or malformed Authorization header".to_string())
                })?;

        let claims = state.verifier.verify(bearer.token()).await.map_err(|e| {
            warn!(reason = e.code(), error = %e, "Rejected bearer token");
            e
        })?;

        Ok(AuthUser(claims))
    }
}
