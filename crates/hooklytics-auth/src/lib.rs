//! # hooklytics-auth
//!
//! Bearer token verification against the identity provider's published
//! JSON Web Key Set.
//!
//! ## Modules
//!
//! - `jwks`: key set fetching and the process-wide key set cache
//! - `jwt`: token claims and signature/claim verification
//! - `error`: the authentication error taxonomy

pub mod error;
pub mod jwks;
pub mod jwt;

pub use error::AuthError;
pub use jwks::{HttpKeySetFetcher, KeySet, KeySetCache, KeySetFetcher, StaticKeySetFetcher};
pub use jwt::{TokenClaims, TokenVerifier};
