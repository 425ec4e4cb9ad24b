//! # Configuration Management
//!
//! Configuration comes from the environment ("12-factor app"), with an optional
//! `.env` file for local development.
//!
//! ## Environment Variables
//! - `HOST` / `PORT`: Server bind address (default: 127.0.0.1:8080)
//! - `DATABASE_URL`: SQLite connection string backing the profile and record stores
//! - `COGNITO_REGION`, `COGNITO_USER_POOL_ID`, `COGNITO_APP_CLIENT_ID`: identity provider
//! - `JWKS_URL`: overrides the key set URL derived from region + pool id
//! - `JWKS_TIMEOUT_SECS`: timeout for the key set fetch (default: 5)
//! - `PROFILES_TABLE_NAME`, `HEALTH_DATA_TABLE_NAME`: store table names
//! - `AUTO_CREATE_TABLES`: create missing tables at startup (default: true)
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`: vision model provider
//! - `CORS_ALLOWED_ORIGINS`: comma separated list of allowed browser origins
//! - `AUTH_DEBUG_ENDPOINT`: expose `GET /auth/debug-token` (default: false)
//!
//! Identity and provider settings are optional. When they are absent the server
//! still starts, and the affected endpoints answer with a "not configured" error.

use anyhow::{bail, Result};
use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Identity provider (Cognito user pool) settings.
#[derive(Debug, Clone, Default)]
pub struct IdentityConfig {
    pub region: Option<String>,
    pub user_pool_id: Option<String>,

    /// Expected `aud` claim of every id token
    pub app_client_id: Option<String>,

    /// Explicit key set URL, mostly useful for local identity emulators
    pub jwks_url: Option<String>,

    pub jwks_timeout: Duration,
}

impl IdentityConfig {
    /// URL of the published key set, if enough settings are present to build it.
    pub fn jwks_url(&self) -> Option<String> {
        if let Some(url) = &self.jwks_url {
            return Some(url.clone());
        }
        match (&self.region, &self.user_pool_id) {
            (Some(region), Some(pool)) => Some(format!(
                "https://cognito-idp.{region}.amazonaws.com/{pool}/.well-known/jwks.json"
            )),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.jwks_url().is_some() && self.app_client_id.is_some()
    }
}

/// Vision model provider settings.
#[derive(Clone)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    /// SQLite database connection URL
    /// Format: "sqlite:filename.db?mode=rwc" (read, write, create)
    pub database_url: String,

    pub profiles_table: String,
    pub health_data_table: String,
    pub auto_create_tables: bool,

    pub identity: IdentityConfig,
    pub vision: VisionConfig,

    pub cors_origins: Vec<String>,
    pub auth_debug_endpoint: bool,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Fails only on values that are present but unparseable, or on table names
    /// that are not plain identifiers.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:caredata.db?mode=rwc".to_string()),
            profiles_table: env::var("PROFILES_TABLE_NAME")
                .unwrap_or_else(|_| "CareDataProfiles".to_string()),
            health_data_table: env::var("HEALTH_DATA_TABLE_NAME")
                .unwrap_or_else(|_| "CareDataHealthData-dev".to_string()),
            auto_create_tables: parse_flag("AUTO_CREATE_TABLES", true)?,
            identity: IdentityConfig {
                region: optional("COGNITO_REGION"),
                user_pool_id: optional("COGNITO_USER_POOL_ID"),
                app_client_id: optional("COGNITO_APP_CLIENT_ID"),
                jwks_url: optional("JWKS_URL"),
                jwks_timeout: Duration::from_secs(
                    env::var("JWKS_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "5".to_string())
                        .parse()?,
                ),
            },
            vision: VisionConfig {
                api_key: optional("OPENAI_API_KEY"),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            },
            cors_origins: split_list(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string()),
            ),
            auth_debug_endpoint: parse_flag("AUTH_DEBUG_ENDPOINT", false)?,
        };

        validate_table_name(&config.profiles_table)?;
        validate_table_name(&config.health_data_table)?;
        validate_cors_origins(&config.cors_origins)?;

        Ok(config)
    }

    /// Socket address to bind the server to, e.g. "127.0.0.1:8080"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads a variable, treating empty values the same as unset ones.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, default: bool) -> Result<bool> {
    match optional(key) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if !valid {
        bail!("invalid table name '{name}'");
    }
    Ok(())
}

/// CORS requests carry credentials, which cannot be combined with a wildcard
/// origin. Every allowed origin must be listed.
pub fn validate_cors_origins(origins: &[String]) -> Result<()> {
    if origins.iter().any(|origin| origin == "*") {
        bail!("CORS_ALLOWED_ORIGINS cannot contain '*'; list each allowed origin");
    }
    Ok(())
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process tests: nothing external is configured.
    pub fn for_tests() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            profiles_table: "CareDataProfiles".to_string(),
            health_data_table: "CareDataHealthData-dev".to_string(),
            auto_create_tables: true,
            identity: IdentityConfig {
                jwks_timeout: Duration::from_secs(5),
                ..IdentityConfig::default()
            },
            vision: VisionConfig {
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
            cors_origins: split_list(DEFAULT_ORIGINS),
            auth_debug_endpoint: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_url_is_derived_from_region_and_pool() {
        let identity = IdentityConfig {
            region: Some("eu-west-2".to_string()),
            user_pool_id: Some("eu-west-2_abc".to_string()),
            app_client_id: Some("client".to_string()),
            ..IdentityConfig::default()
        };
        assert_eq!(
            identity.jwks_url().as_deref(),
            Some("https://cognito-idp.eu-west-2.amazonaws.com/eu-west-2_abc/.well-known/jwks.json")
        );
        assert!(identity.is_configured());
    }

    #[test]
    fn explicit_jwks_url_wins() {
        let identity = IdentityConfig {
            region: Some("eu-west-2".to_string()),
            user_pool_id: Some("pool".to_string()),
            jwks_url: Some("http://localhost:9229/jwks.json".to_string()),
            ..IdentityConfig::default()
        };
        assert_eq!(identity.jwks_url().as_deref(), Some("http://localhost:9229/jwks.json"));
        // no client id, so tokens cannot be checked for audience
        assert!(!identity.is_configured());
    }

    #[test]
    fn missing_pool_means_no_key_set() {
        let identity = IdentityConfig {
            region: Some("us-east-1".to_string()),
            ..IdentityConfig::default()
        };
        assert!(identity.jwks_url().is_none());
    }

    #[test]
    fn table_names_must_be_identifiers() {
        assert!(validate_table_name("CareDataHealthData-dev").is_ok());
        assert!(validate_table_name("profiles_v2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("x\"; DROP TABLE y; --").is_err());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            split_list(" https://a.example , ,https://b.example"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        assert!(validate_cors_origins(&split_list(DEFAULT_ORIGINS)).is_ok());
        assert!(validate_cors_origins(&split_list("*")).is_err());
        assert!(validate_cors_origins(&split_list("http://localhost:5173, *")).is_err());
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let vision = VisionConfig {
            api_key: Some("sk-secret".to_string()),
            model: "m".to_string(),
            base_url: "u".to_string(),
        };
        let shown = format!("{vision:?}");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
