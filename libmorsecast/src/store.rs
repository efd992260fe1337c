//! Embedded key-value store
//!
//! A single SQLite table of string keys and string values. The store is an
//! explicitly opened handle: whoever needs it gets a clone (clones share the
//! connection pool) and [`KvStore::close`] ends its lifecycle.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    /// Open (creating if needed) the store at `path` and run migrations
    pub async fn open(path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(path).to_string();
        let file = Path::new(&expanded_path);

        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::IoError)?;
        }

        // Forward slashes work for SQLite URLs on Windows and Unix;
        // mode=rwc creates the file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(StoreError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::MigrationError)?;

        tracing::debug!("Opened store at {}", expanded_path);
        Ok(Self { pool })
    }

    /// Open an existing store without write access or migrations
    pub async fn open_read_only(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path).to_string();
        let db_url = format!("sqlite://{}?mode=ro", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(StoreError::SqlxError)?;

        Ok(Self { pool })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::SqlxError)?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// Insert or replace the value under `key`
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(StoreError::SqlxError)?;

        Ok(())
    }

    /// Remove `key`; returns whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StoreError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::SqlxError)?;

        Ok(rows.iter().map(|r| r.get::<String, _>("key")).collect())
    }

    /// Close the connection pool; further operations fail
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
