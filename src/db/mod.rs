//! # Database Module
//!
//! Key-value persistence for profiles and health records, keyed by subject
//! identifier. Handlers talk to the [`ProfileStore`] and [`RecordStore`] traits;
//! the backends are:
//! - `profiles` / `records`: SQLite tables through SQLx
//! - `memory`: in-process maps, used by tests and `DATABASE_URL=memory:`
//!
//! ## Error classification
//! A store that points at a table which does not exist is an operator problem
//! ([`StoreError::Misconfigured`]); every other failure is treated as a
//! transient outage ([`StoreError::Unavailable`]).

pub mod memory;
pub mod models;
pub mod profiles;
pub mod records;
pub mod schema;

use crate::db::models::{HealthRecord, Profile};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing table does not exist
    #[error("storage table '{table}' does not exist")]
    Misconfigured { table: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify an SQLx error raised while working on `table`.
    pub fn from_sqlx(table: &str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.message().contains("no such table") => {
                StoreError::Misconfigured {
                    table: table.to_string(),
                }
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, sub: &str) -> StoreResult<Option<Profile>>;

    /// Create or replace the profile stored under `profile.sub`.
    async fn put(&self, profile: &Profile) -> StoreResult<()>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, sub: &str) -> StoreResult<Option<HealthRecord>>;

    /// Full overwrite; there is no partial update.
    async fn put(&self, sub: &str, record: &HealthRecord) -> StoreResult<()>;
}
