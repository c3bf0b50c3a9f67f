//! Token claims and verification.

pub mod claims;
pub mod verifier;

pub use claims::TokenClaims;
pub use verifier::TokenVerifier;
