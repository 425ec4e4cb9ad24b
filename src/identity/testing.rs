//! Token and key set fixtures shared by tests across the crate.

use crate::identity::jwks::{KeySetCache, KeySetSource};
use crate::identity::{IdentityError, TokenVerifier};
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEST_KID: &str = "test-key-1";
pub const TEST_CLIENT_ID: &str = "test-app-client";

const TEST_PRIVATE_KEY: &[u8] = include_bytes!("testdata/test_rsa_key.pem");
const TEST_JWKS: &str = include_str!("testdata/jwks.json");

pub fn test_key_set() -> JwkSet {
    serde_json::from_str(TEST_JWKS).expect("test JWKS parses")
}

/// Key set source that counts fetches and can fail the first `failures` of them.
pub struct CountingSource {
    set: JwkSet,
    failures: usize,
    pub calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(set: JwkSet) -> Self {
        Self::failing_first(set, 0)
    }

    pub fn failing_first(set: JwkSet, failures: usize) -> Self {
        Self {
            set,
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeySetSource for CountingSource {
    async fn fetch(&self) -> Result<JwkSet, IdentityError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(IdentityError::Unavailable("provider timed out".to_string()));
        }
        Ok(self.set.clone())
    }
}

pub fn test_verifier() -> TokenVerifier {
    let cache = KeySetCache::new(Arc::new(CountingSource::new(test_key_set())));
    TokenVerifier::new(cache, Some(TEST_CLIENT_ID.to_string()))
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims of a valid, unexpired id token for `sub`.
pub fn id_token_claims(sub: &str) -> Value {
    json!({
        "sub": sub,
        "aud": TEST_CLIENT_ID,
        "iss": "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_test",
        "token_use": "id",
        "email": format!("{sub}@example.com"),
        "given_name": "Test",
        "family_name": "Patient",
        "iat": now(),
        "exp": now() + 3600,
    })
}

pub fn sign_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("test key parses");
    encode(&header, claims, &key).expect("token encodes")
}

pub fn sign(claims: &Value) -> String {
    sign_with_kid(claims, TEST_KID)
}
