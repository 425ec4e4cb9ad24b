//! # Identity Module
//!
//! Callers authenticate with an id token issued by the identity provider
//! (a Cognito user pool). This module verifies those tokens and maps the
//! verified claims to the service's own profile record.
//!
//! ## Submodules
//! - `claims`: the facts a verified token asserts about the caller
//! - `jwks`: fetch-once cache of the provider's public signing keys
//! - `verifier`: signature, audience and expiry checks
//! - `profile`: get-or-create of the stored profile, with claims-only fallback
//!
//! ## Flow
//! 1. Read the `kid` from the unverified token header
//! 2. Find the matching key in the cached key set
//! 3. Verify RS256 signature, `exp` and `aud`
//! 4. Build [`Claims`] (a missing `sub` rejects the token)
//! 5. Resolve the profile, degrading to claims-only data if storage fails

pub mod claims;
pub mod jwks;
pub mod profile;
pub mod verifier;

#[cfg(test)]
pub mod testing;

pub use claims::Claims;
pub use verifier::TokenVerifier;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    /// Region, user pool or app client id is missing
    #[error("identity provider is not configured")]
    Unconfigured,

    /// Bad signature, unknown key, wrong audience, expired, or no subject
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The key set could not be fetched
    #[error("could not load signing keys: {0}")]
    Unavailable(String),
}

/// First characters of a token, safe to log.
pub fn token_preview(token: &str) -> String {
    token.chars().take(10).collect()
}
