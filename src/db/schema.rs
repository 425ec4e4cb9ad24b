use crate::db::{StoreError, StoreResult};
use sqlx::SqlitePool;

/// Create the profile and health-data tables if they are missing.
///
/// Only called when `AUTO_CREATE_TABLES` is on; otherwise the tables are
/// expected to be provisioned out of band.
pub async fn ensure_tables(
    pool: &SqlitePool,
    profiles_table: &str,
    health_data_table: &str,
) -> StoreResult<()> {
    sqlx::query(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{profiles_table}" (
            sub TEXT PRIMARY KEY NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user'
        )"#
    ))
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_sqlx(profiles_table, e))?;

    sqlx::query(&format!(
        r#"CREATE TABLE IF NOT EXISTS "{health_data_table}" (
            sub TEXT PRIMARY KEY NOT NULL,
            patient TEXT NOT NULL,
            clinical TEXT NOT NULL,
            trend TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#
    ))
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_sqlx(health_data_table, e))?;

    tracing::debug!(profiles_table, health_data_table, "store tables ensured");
    Ok(())
}
