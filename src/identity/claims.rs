//! # Caller Claims
//!
//! The subset of a verified id token the service relies on: `sub` as the
//! caller's stable key, plus the email and name claims used to seed a profile.
//! The full verified payload is kept in `raw`.

use crate::identity::IdentityError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Facts about the caller asserted by a verified id token.
///
/// Built fresh on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Every claim of the token, for diagnostics
    pub raw: Map<String, Value>,
}

impl Claims {
    /// Build claims from a verified token payload.
    ///
    /// A payload without a non-empty `sub` is rejected: nothing downstream can
    /// key a profile or record without it.
    pub fn from_payload(raw: Map<String, Value>) -> Result<Self, IdentityError> {
        let sub = non_empty(&raw, "sub")
            .ok_or_else(|| IdentityError::InvalidToken("token has no subject".to_string()))?;

        let email = non_empty(&raw, "email")
            .or_else(|| non_empty(&raw, "cognito:username"))
            .unwrap_or_default();

        Ok(Claims {
            sub,
            email,
            given_name: non_empty(&raw, "given_name"),
            family_name: non_empty(&raw, "family_name"),
            raw,
        })
    }

    pub fn first_name(&self) -> &str {
        self.given_name.as_deref().unwrap_or("User")
    }

    pub fn last_name(&self) -> &str {
        self.family_name.as_deref().unwrap_or("")
    }
}

fn non_empty(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
