use crate::db::models::{HealthRecord, Profile};
use crate::db::{ProfileStore, RecordStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory profile and record store for tests and throwaway local runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    profiles: Arc<Mutex<HashMap<String, Profile>>>,
    records: Arc<Mutex<HashMap<String, HealthRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Inserts are single calls, so a poisoned map is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, sub: &str) -> StoreResult<Option<Profile>> {
        Ok(lock(&self.profiles).get(sub).cloned())
    }

    async fn put(&self, profile: &Profile) -> StoreResult<()> {
        lock(&self.profiles).insert(profile.sub.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, sub: &str) -> StoreResult<Option<HealthRecord>> {
        Ok(lock(&self.records).get(sub).cloned())
    }

    async fn put(&self, sub: &str, record: &HealthRecord) -> StoreResult<()> {
        lock(&self.records).insert(sub.to_string(), record.clone());
        Ok(())
    }
}

/// Store whose every call fails, for exercising degraded paths.
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct BrokenStore {
    pub missing_table: bool,
}

#[cfg(test)]
impl BrokenStore {
    fn error(&self) -> crate::db::StoreError {
        if self.missing_table {
            crate::db::StoreError::Misconfigured {
                table: "CareDataHealthData-dev".to_string(),
            }
        } else {
            crate::db::StoreError::Unavailable("connection refused".to_string())
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ProfileStore for BrokenStore {
    async fn get(&self, _sub: &str) -> StoreResult<Option<Profile>> {
        Err(self.error())
    }

    async fn put(&self, _profile: &Profile) -> StoreResult<()> {
        Err(self.error())
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for BrokenStore {
    async fn get(&self, _sub: &str) -> StoreResult<Option<HealthRecord>> {
        Err(self.error())
    }

    async fn put(&self, _sub: &str, _record: &HealthRecord) -> StoreResult<()> {
        Err(self.error())
    }
}
