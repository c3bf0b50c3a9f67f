//! Token verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying bearer tokens against the identity provider's JWKS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// URL of the identity provider's JSON Web Key Set.
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// How long a fetched key set is trusted before it is re-fetched.
    #[serde(default = "default_jwks_ttl")]
    pub jwks_ttl_seconds: u64,
    /// How long a failed fetch is remembered before trying again.
    #[serde(default = "default_jwks_failure_ttl")]
    pub jwks_failure_ttl_seconds: u64,
    /// Minimum age of the cached key set before an unknown `kid` may force a refresh.
    #[serde(default = "default_jwks_min_refresh")]
    pub jwks_min_refresh_seconds: u64,
    /// Timeout for a single key set fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
    /// Allowed clock skew when checking `exp` and `nbf`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Expected `iss` claim, if any.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expected `aud` claim, if any.
    #[serde(default)]
    pub audience: Option<String>,
    /// Shared HS256 secret. When set, tokens are verified with it and the
    /// JWKS endpoint is never contacted.
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwks_url: default_jwks_url(),
            jwks_ttl_seconds: default_jwks_ttl(),
            jwks_failure_ttl_seconds: default_jwks_failure_ttl(),
            jwks_min_refresh_seconds: default_jwks_min_refresh(),
            fetch_timeout_seconds: default_fetch_timeout(),
            leeway_seconds: default_leeway(),
            issuer: None,
            audience: None,
            jwt_secret: None,
        }
    }
}

fn default_jwks_url() -> String {
    "http://localhost:3000/api/auth/jwks".to_string()
}

fn default_jwks_ttl() -> u64 {
    300
}

fn default_jwks_failure_ttl() -> u64 {
    10
}

fn default_jwks_min_refresh() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    5
}

fn default_leeway() -> u64 {
    5
}
