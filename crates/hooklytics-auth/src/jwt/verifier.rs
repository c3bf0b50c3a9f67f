//! Bearer token verification against the cached key set.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use tracing::debug;

use hooklytics_core::config::AuthConfig;

use crate::error::AuthError;
use crate::jwks::cache::KeySetCache;
use crate::jwt::claims::TokenClaims;

/// Verifies tokens issued by the identity provider.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    cache: Arc<KeySetCache>,
    jwks_url: String,
    leeway_seconds: u64,
    issuer: Option<String>,
    audience: Option<String>,
}

impl TokenVerifier {
    /// Creates a verifier that resolves keys through `cache`.
    pub fn new(cache: Arc<KeySetCache>, config: &AuthConfig) -> Self {
        Self {
            cache,
            jwks_url: config.jwks_url.clone(),
            leeway_seconds: config.leeway_seconds,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Verifies the signature and registered claims of `token`.
    ///
    /// Checks:
    /// 1. The header parses and names a key we hold (refreshing once on rotation)
    /// 2. The signature verifies with that key's algorithm
    /// 3. `exp` / `nbf` (with leeway), plus `iss` / `aud` when configured
    /// 4. The payload decodes into [`TokenClaims`]
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("malformed token: {e}")))?;

        let mut key_set = self.cache.get(&self.jwks_url).await?;
        if let Some(kid) = header.kid.as_deref() {
            if !key_set.contains_kid(kid) {
                key_set = self.cache.refresh(&self.jwks_url, &key_set).await?;
            }
        }

        let candidates = key_set.candidates(header.kid.as_deref(), header.alg);
        if candidates.is_empty() {
            return Err(AuthError::InvalidToken(format!(
                "no verification key for kid {:?} and algorithm {:?}",
                header.kid, header.alg
            )));
        }

        let mut last_error = None;
        for key in candidates {
            match decode::<TokenClaims>(token, &key.key, &self.validation(key.algorithm)) {
                Ok(data) => {
                    debug!(sub = %data.claims.sub, kid = ?key.kid, "Token verified");
                    return Ok(data.claims);
                }
                Err(e) => {
                    // Claim checks run only after the signature verified.
                    if matches!(e.kind(), JwtErrorKind::ExpiredSignature) {
                        return Err(AuthError::TokenExpired);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => map_jwt_error(&e),
            None => AuthError::InvalidToken("token could not be verified".to_string()),
        })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        // jsonwebtoken only compares `iss` / `aud` when the token carries them.
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &self.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        validation
    }
}

fn map_jwt_error(err: &jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
        JwtErrorKind::InvalidSignature => AuthError::InvalidToken("invalid signature".to_string()),
        JwtErrorKind::ImmatureSignature => {
            AuthError::InvalidToken("token is not valid yet".to_string())
        }
        JwtErrorKind::InvalidIssuer => AuthError::InvalidToken("unexpected issuer".to_string()),
        JwtErrorKind::InvalidAudience => AuthError::InvalidToken("unexpected audience".to_string()),
        JwtErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidToken(format!("missing required claim '{claim}'"))
        }
        JwtErrorKind::Json(e) => AuthError::InvalidToken(format!("claims could not be decoded: {e}")),
        _ => AuthError::InvalidToken(err.to_string()),
    }
}
