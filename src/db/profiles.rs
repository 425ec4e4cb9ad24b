use crate::db::models::{Profile, Role};
use crate::db::{ProfileStore, StoreError, StoreResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Profiles table in SQLite, one row per subject.
#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
    table: String,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    sub: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            sub: row.sub,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: Role::normalize(&row.role),
        }
    }
}

impl SqliteProfileStore {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, sub: &str) -> StoreResult<Option<Profile>> {
        let sql = format!(
            r#"SELECT sub, first_name, last_name, email, role FROM "{}" WHERE sub = ?"#,
            self.table
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(sub)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&self.table, e))?;

        Ok(row.map(Profile::from))
    }

    async fn put(&self, profile: &Profile) -> StoreResult<()> {
        let sql = format!(
            r#"INSERT OR REPLACE INTO "{}" (sub, first_name, last_name, email, role)
               VALUES (?, ?, ?, ?, ?)"#,
            self.table
        );
        sqlx::query(&sql)
            .bind(&profile.sub)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.email)
            .bind(profile.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&self.table, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::ensure_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    // One connection: every connection to sqlite::memory: is its own database.
    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    fn ada() -> Profile {
        Profile {
            sub: "sub-ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn put_then_get() {
        let pool = memory_pool().await;
        ensure_tables(&pool, "profiles", "health").await.unwrap();
        let store = SqliteProfileStore::new(pool, "profiles");

        assert!(store.get("sub-ada").await.unwrap().is_none());

        store.put(&ada()).await.unwrap();
        assert_eq!(store.get("sub-ada").await.unwrap(), Some(ada()));
    }

    #[tokio::test]
    async fn unknown_roles_read_back_as_user() {
        let pool = memory_pool().await;
        ensure_tables(&pool, "profiles", "health").await.unwrap();
        sqlx::query(
            "INSERT INTO profiles (sub, first_name, last_name, email, role) VALUES ('s', 'A', 'B', '', 'owner')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let store = SqliteProfileStore::new(pool, "profiles");
        let profile = store.get("s").await.unwrap().unwrap();
        assert_eq!(profile.role, Role::User);
    }

    #[tokio::test]
    async fn missing_table_is_misconfigured() {
        let store = SqliteProfileStore::new(memory_pool().await, "CareDataProfiles");

        let err = store.get("sub-ada").await.unwrap_err();
        assert!(matches!(err, StoreError::Misconfigured { ref table } if table == "CareDataProfiles"));

        let err = store.put(&ada()).await.unwrap_err();
        assert!(matches!(err, StoreError::Misconfigured { .. }));
    }

    #[tokio::test]
    async fn closed_pool_is_unavailable() {
        let pool = memory_pool().await;
        ensure_tables(&pool, "profiles", "health").await.unwrap();
        let store = SqliteProfileStore::new(pool.clone(), "profiles");
        pool.close().await;

        let err = store.get("sub-ada").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
