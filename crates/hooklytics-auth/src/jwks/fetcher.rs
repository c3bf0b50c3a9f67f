//! Sources of verification keys.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tracing::debug;

use crate::error::AuthError;
use crate::jwks::key_set::{KeySet, VerificationKey};

/// Capability to obtain the key set published at a URL.
///
/// The cache only depends on this trait, so tests substitute an in-process fake.
#[async_trait]
pub trait KeySetFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the key set published at `url`.
    async fn fetch(&self, url: &str) -> Result<KeySet, AuthError>;
}

/// Fetches JWKS documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
}

impl HttpKeySetFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self, url: &str) -> Result<KeySet, AuthError> {
        debug!(url, "Fetching JWKS");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("request to {url} failed: {e}")))?;

        let response = response.error_for_status().map_err(|e| {
            AuthError::KeySetUnavailable(format!("JWKS endpoint returned an error: {e}"))
        })?;

        let jwks = response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("JWKS body is not a key set: {e}")))?;

        Ok(KeySet::from_jwks(&jwks))
    }
}

/// Serves keys configured locally instead of fetched.
///
/// Used when the deployment verifies tokens with a shared HMAC secret.
#[derive(Debug, Clone)]
pub struct StaticKeySetFetcher {
    keys: Vec<VerificationKey>,
}

impl StaticKeySetFetcher {
    /// A single HS256 key; `kid` of `None` matches tokens with any `kid`.
    pub fn from_secret(kid: Option<String>, secret: &[u8]) -> Self {
        Self {
            keys: vec![VerificationKey::hmac(kid, secret)],
        }
    }
}

#[async_trait]
impl KeySetFetcher for StaticKeySetFetcher {
    async fn fetch(&self, _url: &str) -> Result<KeySet, AuthError> {
        Ok(KeySet::new(self.keys.clone()))
    }
}
