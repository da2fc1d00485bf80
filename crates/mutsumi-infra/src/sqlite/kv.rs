//! SQLite key-value store.
//!
//! Implements `KvStore` from `mutsumi-core` over the `kv_store` table.
//! Used both for the durable store in the data directory and for the
//! process-scoped store in a temporary directory.

use chrono::Utc;
use sqlx::Row;

use mutsumi_core::storage::kv_store::KvStore;
use mutsumi_types::error::StorageError;
use mutsumi_types::storage::StoreMedium;

use super::pool::DatabasePool;

pub struct SqliteKvStore {
    pool: DatabasePool,
    medium: StoreMedium,
    quota: Option<u64>,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool, medium: StoreMedium, quota: Option<u64>) -> Self {
        Self {
            pool,
            medium,
            quota,
        }
    }
}

fn backend(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

impl KvStore for SqliteKvStore {
    fn medium(&self) -> StoreMedium {
        self.medium
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(backend)?;

        row.map(|row| row.try_get::<String, _>("value"))
            .transpose()
            .map_err(backend)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.writer.begin().await.map_err(backend)?;

        if let Some(quota) = self.quota {
            let (others,): (i64,) = sqlx::query_as(
                "SELECT COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM kv_store WHERE key != ?",
            )
            .bind(key)
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;

            let needed = others.max(0) as u64 + value.len() as u64;
            if needed > quota {
                // Dropping the transaction rolls it back.
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool.writer)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
