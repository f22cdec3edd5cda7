//! SQL-backed config store (SQLite/PostgreSQL/MySQL)
//!
//! One table per record kind, keyed `(app_name, record_id)`, with the full
//! record serialized into a JSON `value` column. All kinds of one runtime
//! share a single `AnyPool` opened through [`open_pool`].

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};

use super::{ConfigKey, ConfigRecord, ConfigStore, StoreError, StoreResult};

/// Open the connection pool shared by the SQL config stores.
///
/// Accepts `sqlite:`, `postgres:`/`postgresql:`, and `mysql:`/`mariadb:`
/// URLs. In-memory SQLite databases are always pooled with exactly one
/// connection: each further connection would open its own empty database
/// and the config tables would appear and vanish per query.
pub async fn open_pool(
    url: &str,
    max_connections: u32,
    connect_timeout: Duration,
) -> StoreResult<AnyPool> {
    sqlx::any::install_default_drivers();

    let scheme = url.split(':').next().unwrap_or("");
    if !matches!(
        scheme,
        "sqlite" | "postgres" | "postgresql" | "mysql" | "mariadb"
    ) {
        return Err(StoreError::Connection(format!(
            "unsupported database URL scheme '{scheme}' (expected sqlite, postgres, or mysql)"
        )));
    }

    let max_connections = if is_sqlite_memory(url) {
        1
    } else {
        max_connections.max(1)
    };

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(connect_timeout)
        .connect(url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    tracing::info!("Opened {scheme} config database pool with {max_connections} connections");
    Ok(pool)
}

fn is_sqlite_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// SQL implementation of [`ConfigStore`]
pub struct SqlConfigStore<T> {
    pool: AnyPool,
    _record: PhantomData<fn() -> T>,
}

impl<T: ConfigRecord> SqlConfigStore<T> {
    /// Bind the store to a pool, creating the kind's table if needed.
    pub async fn new(pool: AnyPool) -> StoreResult<Self> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                app_name TEXT NOT NULL,
                record_id TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (app_name, record_id)
            )",
            T::KIND
        );
        sqlx::query(&ddl).execute(&pool).await?;

        tracing::debug!("Initialized config table '{}'", T::KIND);

        Ok(Self {
            pool,
            _record: PhantomData,
        })
    }

    async fn exists(&self, key: &ConfigKey) -> StoreResult<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE app_name = ? AND record_id = ?",
            T::KIND
        );
        let row = sqlx::query(&sql)
            .bind(&key.app_name)
            .bind(&key.record_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl<T: ConfigRecord> ConfigStore<T> for SqlConfigStore<T> {
    async fn create(&self, record: &T) -> StoreResult<()> {
        let key = record.key();
        let value = serde_json::to_string(record)?;

        let sql = format!(
            "INSERT INTO {} (app_name, record_id, value) VALUES (?, ?, ?)",
            T::KIND
        );
        let result = sqlx::query(&sql)
            .bind(&key.app_name)
            .bind(&key.record_id)
            .bind(&value)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::AlreadyExists {
                    kind: T::KIND,
                    key: key.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &ConfigKey) -> StoreResult<Option<T>> {
        let sql = format!(
            "SELECT value FROM {} WHERE app_name = ? AND record_id = ?",
            T::KIND
        );
        let row = sqlx::query(&sql)
            .bind(&key.app_name)
            .bind(&key.record_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value")?;
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, record: &T) -> StoreResult<()> {
        let key = record.key();

        // Existence is checked up front: some backends report zero affected
        // rows for updates that leave the row byte-identical.
        if !self.exists(&key).await? {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                key: key.to_string(),
            });
        }

        let value = serde_json::to_string(record)?;
        let sql = format!(
            "UPDATE {} SET value = ? WHERE app_name = ? AND record_id = ?",
            T::KIND
        );
        sqlx::query(&sql)
            .bind(&value)
            .bind(&key.app_name)
            .bind(&key.record_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, key: &ConfigKey) -> StoreResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE app_name = ? AND record_id = ?",
            T::KIND
        );
        sqlx::query(&sql)
            .bind(&key.app_name)
            .bind(&key.record_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        let sql = format!(
            "SELECT value FROM {} ORDER BY app_name, record_id",
            T::KIND
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let value: String = row.try_get("value")?;
            records.push(serde_json::from_str(&value)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unsupported_url_schemes() {
        for url in ["redis://localhost", "mongodb://localhost/db", "configs.db", ""] {
            let err = open_pool(url, 5, Duration::from_secs(1)).await.unwrap_err();
            assert!(matches!(err, StoreError::Connection(_)), "accepted {url:?}");
        }
    }

    #[test]
    fn test_memory_url_detection() {
        assert!(is_sqlite_memory("sqlite::memory:"));
        assert!(is_sqlite_memory("sqlite://configs.db?mode=memory&cache=shared"));
        assert!(!is_sqlite_memory("sqlite://configs.db"));
        assert!(!is_sqlite_memory("postgres://localhost/db"));
    }

    #[tokio::test]
    async fn test_memory_sqlite_shares_one_database() {
        // A generous connection limit must not split the in-memory
        // database: every query below has to see the same table.
        let pool = open_pool("sqlite::memory:", 8, Duration::from_secs(1))
            .await
            .unwrap();

        sqlx::query("CREATE TABLE probe (n INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        for n in 0..4_i64 {
            sqlx::query("INSERT INTO probe (n) VALUES (?)")
                .bind(n)
                .execute(&pool)
                .await
                .unwrap();
        }

        let row = sqlx::query("SELECT COUNT(*) AS total FROM probe")
            .fetch_one(&pool)
            .await
            .unwrap();
        let total: i64 = row.try_get("total").unwrap();
        assert_eq!(total, 4);
    }
}
