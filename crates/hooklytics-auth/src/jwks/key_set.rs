//! Parsed, ready-to-use verification keys.

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use tracing::warn;

/// One usable key from a JWKS.
#[derive(Clone)]
pub struct VerificationKey {
    /// The `kid` the key was published under.
    pub kid: Option<String>,
    /// The only algorithm this key verifies.
    pub algorithm: Algorithm,
    /// Key material.
    pub key: DecodingKey,
}

impl VerificationKey {
    /// An HS256 key from a raw shared secret.
    pub fn hmac(kid: Option<String>, secret: &[u8]) -> Self {
        Self {
            kid,
            algorithm: Algorithm::HS256,
            key: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// The verification keys of one JWKS fetch.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: Vec<VerificationKey>,
    fetched_at: Instant,
}

impl KeySet {
    /// Wraps already-parsed keys, stamped with the current time.
    pub fn new(keys: Vec<VerificationKey>) -> Self {
        Self {
            keys,
            fetched_at: Instant::now(),
        }
    }

    /// Builds a key set, skipping keys that cannot verify signatures.
    pub fn from_jwks(jwks: &JwkSet) -> Self {
        let keys = jwks
            .keys
            .iter()
            .filter_map(|jwk| match to_verification_key(jwk) {
                Ok(key) => Some(key),
                Err(reason) => {
                    warn!(kid = ?jwk.common.key_id, %reason, "Skipping unusable JWK");
                    None
                }
            })
            .collect();

        Self::new(keys)
    }

    /// Number of usable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no usable key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time since this set was fetched.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Whether any key was published under `kid`.
    pub fn contains_kid(&self, kid: &str) -> bool {
        self.keys.iter().any(|k| k.kid.as_deref() == Some(kid))
    }

    /// Keys that may have signed a token with the given header values.
    ///
    /// A key is only offered for the algorithm it was published for. Keys
    /// published without a `kid` are offered for every token.
    pub fn candidates(&self, kid: Option<&str>, algorithm: Algorithm) -> Vec<&VerificationKey> {
        self.keys
            .iter()
            .filter(|k| k.algorithm == algorithm)
            .filter(|k| match (kid, k.kid.as_deref()) {
                (Some(wanted), Some(published)) => wanted == published,
                _ => true,
            })
            .collect()
    }
}

fn to_verification_key(jwk: &Jwk) -> Result<VerificationKey, String> {
    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        return Err("key is published for encryption".to_string());
    }

    let algorithm = match jwk.common.key_algorithm {
        Some(alg) => from_key_algorithm(alg)?,
        None => infer_algorithm(&jwk.algorithm)?,
    };

    let key = DecodingKey::from_jwk(jwk).map_err(|e| e.to_string())?;

    Ok(VerificationKey {
        kid: jwk.common.key_id.clone(),
        algorithm,
        key,
    })
}

fn from_key_algorithm(alg: KeyAlgorithm) -> Result<Algorithm, String> {
    let algorithm = match alg {
        KeyAlgorithm::HS256 => Algorithm::HS256,
        KeyAlgorithm::HS384 => Algorithm::HS384,
        KeyAlgorithm::HS512 => Algorithm::HS512,
        KeyAlgorithm::ES256 => Algorithm::ES256,
        KeyAlgorithm::ES384 => Algorithm::ES384,
        KeyAlgorithm::RS256 => Algorithm::RS256,
        KeyAlgorithm::RS384 => Algorithm::RS384,
        KeyAlgorithm::RS512 => Algorithm::RS512,
        KeyAlgorithm::PS256 => Algorithm::PS256,
        KeyAlgorithm::PS384 => Algorithm::PS384,
        KeyAlgorithm::PS512 => Algorithm::PS512,
        KeyAlgorithm::EdDSA => Algorithm::EdDSA,
        other => return Err(format!("unsupported key algorithm {other:?}")),
    };
    Ok(algorithm)
}

/// Picks the conventional algorithm when the JWK omits `alg`.
fn infer_algorithm(params: &AlgorithmParameters) -> Result<Algorithm, String> {
    match params {
        AlgorithmParameters::EllipticCurve(ec) => match ec.curve {
            EllipticCurve::P256 => Ok(Algorithm::ES256),
            EllipticCurve::P384 => Ok(Algorithm::ES384),
            ref other => Err(format!("unsupported curve {other:?}")),
        },
        AlgorithmParameters::RSA(_) => Ok(Algorithm::RS256),
        AlgorithmParameters::OctetKey(_) => Ok(Algorithm::HS256),
        AlgorithmParameters::OctetKeyPair(_) => Ok(Algorithm::EdDSA),
        #[allow(unreachable_patterns)]
        _ => Err("unsupported key type".to_string()),
    }
}
