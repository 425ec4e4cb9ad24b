//! # Application State
//!
//! Resources shared by every request handler. Axum clones the state per
//! request, so everything here sits behind an `Arc`.

use crate::config::Config;
use crate::db::memory::MemoryStore;
use crate::db::profiles::SqliteProfileStore;
use crate::db::records::SqliteRecordStore;
use crate::db::{schema, ProfileStore, RecordStore};
use crate::identity::jwks::{HttpKeySetSource, KeySetCache};
use crate::identity::TokenVerifier;
use crate::scan::provider::{OpenAiVision, VisionModel};
use crate::scan::Extractor;
use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: Arc<dyn ProfileStore>,
    pub records: Arc<dyn RecordStore>,

    /// Owns the process-wide key set cache
    pub verifier: Arc<TokenVerifier>,

    pub extractor: Arc<Extractor>,
}

impl AppState {
    /// Connect the stores and build the verifier and extractor.
    ///
    /// Missing identity or provider settings are logged, not fatal.
    pub async fn new(config: &Config) -> Result<Self> {
        let (profiles, records) = connect_stores(config).await?;

        let keys = match config.identity.jwks_url() {
            Some(url) => KeySetCache::new(Arc::new(HttpKeySetSource::new(
                url,
                config.identity.jwks_timeout,
            )?)),
            None => {
                tracing::warn!("COGNITO_REGION / COGNITO_USER_POOL_ID not set; token verification disabled");
                KeySetCache::unconfigured()
            }
        };
        if !config.identity.is_configured() {
            tracing::warn!("Identity provider incomplete; protected routes will answer 503");
        }
        let verifier = TokenVerifier::new(keys, config.identity.app_client_id.clone());

        let model = OpenAiVision::from_config(&config.vision)
            .map(|provider| Arc::new(provider) as Arc<dyn VisionModel>);
        if model.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; health scan disabled");
        }

        Ok(AppState {
            config: Arc::new(config.clone()),
            profiles,
            records,
            verifier: Arc::new(verifier),
            extractor: Arc::new(Extractor::new(model)),
        })
    }
}

async fn connect_stores(config: &Config) -> Result<(Arc<dyn ProfileStore>, Arc<dyn RecordStore>)> {
    if config.database_url == "memory:" {
        tracing::warn!("Using in-memory stores; data is lost on restart");
        let store = MemoryStore::new();
        return Ok((Arc::new(store.clone()), Arc::new(store)));
    }

    let pool = SqlitePool::connect(&config.database_url).await?;
    if config.auto_create_tables {
        schema::ensure_tables(&pool, &config.profiles_table, &config.health_data_table).await?;
    }

    Ok((
        Arc::new(SqliteProfileStore::new(pool.clone(), config.profiles_table.clone())),
        Arc::new(SqliteRecordStore::new(pool, config.health_data_table.clone())),
    ))
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory store, the test key set and the given model.
    pub fn for_tests(model: Option<Arc<dyn VisionModel>>) -> (Self, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState {
            config: Arc::new(Config::for_tests()),
            profiles: Arc::new(store.clone()),
            records: Arc::new(store.clone()),
            verifier: Arc::new(crate::identity::testing::test_verifier()),
            extractor: Arc::new(Extractor::new(model)),
        };
        (state, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_state_still_builds() {
        let config = Config::for_tests();
        let state = AppState::new(&config).await.unwrap();

        assert!(!state.verifier.is_configured());
        assert!(!state.extractor.is_configured());
    }

    #[tokio::test]
    async fn memory_database_url() {
        let mut config = Config::for_tests();
        config.database_url = "memory:".to_string();
        let state = AppState::new(&config).await.unwrap();

        assert!(state.records.get("anyone").await.unwrap().is_none());
    }
}
