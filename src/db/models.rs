//! # Stored Models
//!
//! Records persisted by the profile and health-record stores. Both are keyed by
//! the identity provider's subject identifier (`sub`), which is stable across
//! token refreshes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Role of a caller inside this service.
///
/// Stored as lowercase text. Anything unrecognised reads back as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn normalize(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// The service's own record of a caller.
///
/// Serialized with `sub` exposed as `id`, which is what `/auth/me` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "id")]
    pub sub: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

/// One free-form section of a health record.
pub type Section = BTreeMap<String, String>;

/// Three independent string-to-string sections saved per caller.
///
/// Every value is a string. Saving replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(default)]
    pub patient: Section,
    #[serde(default)]
    pub clinical: Section,
    #[serde(default)]
    pub trend: Section,
}

impl HealthRecord {
    /// Build a record from loosely typed JSON sections, stringifying every value.
    pub fn from_loose(
        patient: &Map<String, Value>,
        clinical: &Map<String, Value>,
        trend: &Map<String, Value>,
    ) -> Self {
        Self {
            patient: coerce_section(patient),
            clinical: coerce_section(clinical),
            trend: coerce_section(trend),
        }
    }
}

fn coerce_section(section: &Map<String, Value>) -> Section {
    section
        .iter()
        .map(|(k, v)| (k.clone(), coerce_to_string(v)))
        .collect()
}

/// Coerce any JSON value to the string form stored and shown by the UI.
///
/// `null` and empty containers become `""`, numbers and booleans use their
/// JSON text, strings pass through untouched, non-empty containers are kept
/// as compact JSON.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(a) if a.is_empty() => String::new(),
        Value::Object(o) if o.is_empty() => String::new(),
        other => other.to_string(),
    }
}
