//! # Signing Key Set
//!
//! The identity provider publishes its public signing keys as a JWK set. The
//! set is fetched on first use and kept for the lifetime of the process; a
//! rotated key is only picked up after a restart.

use crate::identity::IdentityError;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Somewhere a key set can be loaded from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, IdentityError>;
}

/// Fetches the key set over HTTPS from the provider's well-known URL.
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySetSource {
    /// The timeout bounds the whole request so an unreachable provider cannot
    /// hang the request path.
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, IdentityError> {
        tracing::debug!("Fetching signing keys from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("malformed key set: {e}")))
    }
}

/// Fetch-once cache in front of a [`KeySetSource`].
///
/// Concurrent first callers share a single fetch. A failed fetch is not
/// remembered, so the next request tries again.
pub struct KeySetCache {
    source: Option<Arc<dyn KeySetSource>>,
    keys: OnceCell<Arc<JwkSet>>,
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySetSource>) -> Self {
        Self {
            source: Some(source),
            keys: OnceCell::new(),
        }
    }

    /// A cache with nowhere to fetch from; every lookup is `Unconfigured`.
    pub fn unconfigured() -> Self {
        Self {
            source: None,
            keys: OnceCell::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    pub async fn get_keys(&self) -> Result<Arc<JwkSet>, IdentityError> {
        let source = self.source.as_ref().ok_or(IdentityError::Unconfigured)?;

        let keys = self
            .keys
            .get_or_try_init(|| async {
                let set = source.fetch().await.map_err(|e| {
                    tracing::warn!("Signing key fetch failed: {}", e);
                    e
                })?;
                tracing::info!("Loaded {} signing keys", set.keys.len());
                Ok::<_, IdentityError>(Arc::new(set))
            })
            .await?;

        Ok(Arc::clone(keys))
    }
}
