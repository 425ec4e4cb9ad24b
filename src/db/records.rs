//! # Health Records
//!
//! One record per caller, keyed by `sub`, holding the patient, clinical and
//! trend sections. A put replaces the whole record; a missing record reads
//! as three empty sections.

use crate::db::models::{HealthRecord, Section};
use crate::db::{RecordStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

/// Read the caller's health record. A caller with nothing saved gets three
/// empty sections rather than an error.
pub async fn get_record(store: &dyn RecordStore, sub: &str) -> StoreResult<HealthRecord> {
    Ok(store.get(sub).await?.unwrap_or_default())
}

/// Overwrite the caller's health record.
pub async fn put_record(store: &dyn RecordStore, sub: &str, record: &HealthRecord) -> StoreResult<()> {
    store.put(sub, record).await.map_err(|e| {
        tracing::warn!("Saving health record failed: {}", e);
        e
    })
}

/// Health-data table in SQLite. Sections are kept as JSON text columns.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    table: String,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    patient: String,
    clinical: String,
    trend: String,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn decode_section(&self, raw: &str) -> StoreResult<Section> {
        serde_json::from_str(raw).map_err(|e| {
            StoreError::Unavailable(format!("corrupt section in '{}': {}", self.table, e))
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get(&self, sub: &str) -> StoreResult<Option<HealthRecord>> {
        let sql = format!(
            r#"SELECT patient, clinical, trend FROM "{}" WHERE sub = ?"#,
            self.table
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(sub)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&self.table, e))?;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(HealthRecord {
                patient: self.decode_section(&row.patient)?,
                clinical: self.decode_section(&row.clinical)?,
                trend: self.decode_section(&row.trend)?,
            })),
        }
    }

    async fn put(&self, sub: &str, record: &HealthRecord) -> StoreResult<()> {
        let encode = |section: &Section| {
            serde_json::to_string(section).map_err(|e| StoreError::Unavailable(e.to_string()))
        };

        let sql = format!(
            r#"INSERT OR REPLACE INTO "{}" (sub, patient, clinical, trend, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
            self.table
        );
        sqlx::query(&sql)
            .bind(sub)
            .bind(encode(&record.patient)?)
            .bind(encode(&record.clinical)?)
            .bind(encode(&record.trend)?)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&self.table, e))?;

        Ok(())
    }
}
