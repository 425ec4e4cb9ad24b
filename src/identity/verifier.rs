//! # Token Verification
//!
//! Checks a Cognito id token before any claim in it is trusted:
//! 1. Read the `kid` from the unverified header
//! 2. Find that key in the user pool's key set (fetched once, then cached)
//! 3. Verify the RS256 signature, `exp` (no leeway) and `aud` (the app client id)
//!
//! A bad token is `InvalidToken`. A missing client id is `Unconfigured`, and an
//! unreachable key set is `Unavailable`.

use crate::identity::jwks::KeySetCache;
use crate::identity::{token_preview, Claims, IdentityError};
use base64::prelude::*;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use serde_json::{Map, Value};

/// Verifies id tokens against the provider's key set.
pub struct TokenVerifier {
    keys: KeySetCache,
    client_id: Option<String>,
}

/// What `/auth/debug-token` reports about a token it has not verified.
#[derive(Debug, Serialize)]
pub struct TokenInspection {
    pub has_token: bool,
    pub unverified_claims: Map<String, Value>,
    pub audience: Option<Value>,
    pub expected_audience: Option<String>,
    pub matches: bool,
}

impl TokenVerifier {
    pub fn new(keys: KeySetCache, client_id: Option<String>) -> Self {
        Self { keys, client_id }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_configured() && self.client_id.is_some()
    }

    /// Verify signature, expiry and audience, and return the caller's claims.
    ///
    /// No retry happens here; a failed key fetch is reported as `Unavailable`
    /// and the caller may retry the whole request.
    pub async fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        let client_id = self.client_id.as_deref().ok_or(IdentityError::Unconfigured)?;

        let header = decode_header(token).map_err(|e| self.reject(token, e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| self.reject(token, "token header has no key id".to_string()))?;

        let keys = self.keys.get_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| self.reject(token, format!("unknown signing key '{kid}'")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| self.reject(token, e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is exact; a token is dead the second `exp` passes.
        validation.leeway = 0;
        validation.set_audience(&[client_id]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        let data = decode::<Map<String, Value>>(token, &key, &validation)
            .map_err(|e| self.reject(token, e.to_string()))?;

        Claims::from_payload(data.claims)
    }

    /// Decode the payload without checking anything, for troubleshooting
    /// audience mismatches.
    pub fn inspect_unverified(&self, token: &str) -> Result<TokenInspection, IdentityError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| IdentityError::InvalidToken("not a JWT".to_string()))?;
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        let claims: Map<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let audience = claims.get("aud").cloned();
        let matches = match (&audience, &self.client_id) {
            (Some(Value::String(aud)), Some(expected)) => aud == expected,
            (Some(Value::Array(auds)), Some(expected)) => {
                auds.iter().any(|a| a.as_str() == Some(expected.as_str()))
            }
            _ => false,
        };

        Ok(TokenInspection {
            has_token: true,
            unverified_claims: claims,
            audience,
            expected_audience: self.client_id.clone(),
            matches,
        })
    }

    fn reject(&self, token: &str, reason: String) -> IdentityError {
        tracing::warn!(
            "JWT verification failed: {} (token preview: {}...)",
            reason,
            token_preview(token)
        );
        IdentityError::InvalidToken(reason)
    }
}
