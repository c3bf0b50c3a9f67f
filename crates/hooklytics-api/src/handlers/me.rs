//! Caller identity handler.

use axum::Json;

use crate::dto::response::MeResponse;
use crate::extractors::AuthUser;

/// GET /api/me
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    let claims = auth.claims();
    Json(MeResponse {
        user_id: claims.subject_id().to_string(),
        email: claims.email.clone(),
        user_type: claims.user_type.clone(),
        issuer: claims.iss.clone(),
        expires_at: claims.expires_at(),
    })
}
