//! Claims carried by identity provider tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity claims extracted from a verified token.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the platform user ID.
    pub sub: String,
    /// User ID as emitted by the identity provider's session payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Account e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account tier.
    #[serde(default, rename = "userType", alias = "user_type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience; a string or an array of strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Not-before (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Issued-at (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Token ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl TokenClaims {
    /// The platform user the token was issued to.
    pub fn subject_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.sub)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_identity_provider_payload() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "user_123",
            "id": "user_123",
            "email": "owner@example.com",
            "userType": "pro",
            "iss": "http://localhost:3000",
            "aud": ["http://localhost:3000"],
            "exp": 1_900_000_000,
            "iat": 1_700_000_000
        }))
        .unwrap();

        assert_eq!(claims.subject_id(), "user_123");
        assert_eq!(claims.user_type.as_deref(), Some("pro"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_subject_falls_back_to_sub() {
        let claims: TokenClaims =
            serde_json::from_value(serde_json::json!({ "sub": "abc", "exp": 1 })).unwrap();
        assert_eq!(claims.subject_id(), "abc");
    }
}
