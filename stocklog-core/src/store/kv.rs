//! Durable key-value storage backed by a single versioned SQLite database.
//!
//! One database file, one table:
//! ```text
//! kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)
//! ```
//! Values are JSON documents; each `put` replaces the value for its key
//! wholesale. The schema version is stamped into `PRAGMA user_version` so a
//! database written by a newer release is refused instead of misread.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Errors that can occur during key-value store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The database could not be opened or is from a newer release.
    /// Fatal for the session; reopening is the recovery path.
    Unavailable(String),
    /// Low-level failure reading a key (key, cause).
    Read(String, String),
    /// Low-level failure writing a key (key, cause).
    Write(String, String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "storage unavailable: {}", e),
            StoreError::Read(key, e) => write!(f, "failed to read key '{}': {}", key, e),
            StoreError::Write(key, e) => write!(f, "failed to write key '{}': {}", key, e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key-value store over a single SQLite database.
///
/// Cheap to clone; clones share the same connection pool. Reading a key that
/// has never been written returns `Ok(None)`, never an error.
#[derive(Clone, Debug)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    /// Opens (or creates) the database at `path` and ensures the `kv` table
    /// exists. Creates missing parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if version > SCHEMA_VERSION {
            return Err(StoreError::Unavailable(format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }

        sqlx::query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if version < SCHEMA_VERSION {
            sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
                .execute(&pool)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        tracing::debug!(path = %path.display(), "opened key-value store");

        Ok(Self { pool })
    }

    /// Reads and decodes the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_value(key).await? {
            Some(value) => {
                let typed = serde_json::from_value(value).map_err(|e| {
                    StoreError::Read(key.to_string(), format!("stored value does not decode: {}", e))
                })?;
                Ok(Some(typed))
            }
            None => Ok(None),
        }
    }

    /// Reads the raw JSON document stored under `key`.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Read(key.to_string(), e.to_string()))?;

        match row {
            Some(text) => {
                let value = serde_json::from_str(&text).map_err(|e| {
                    StoreError::Read(key.to_string(), format!("stored value is not valid JSON: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Serializes `value` and overwrites the value for `key` wholesale.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|e| {
            StoreError::Write(key.to_string(), format!("value does not serialize: {}", e))
        })?;
        self.put_value(key, &json).await
    }

    /// Overwrites the raw JSON document for `key` wholesale.
    pub async fn put_value(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let text = value.to_string();

        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(&text)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(key.to_string(), e.to_string()))?;

        tracing::trace!(key, bytes = text.len(), "stored value");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (KvStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = KvStore::open(temp_dir.path().join("test.db")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data").join("test.db");

        KvStore::open(&path).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_get_absent_key_returns_none() {
        let (store, _temp) = test_store().await;
        let value: Option<String> = store.get("never-written").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (store, _temp) = test_store().await;

        store.put("greeting", &"hello".to_string()).await.unwrap();
        let value: Option<String> = store.get("greeting").await.unwrap();

        assert_eq!(value, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let (store, _temp) = test_store().await;

        store.put("counter", &41u32).await.unwrap();

        let first: Option<u32> = store.get("counter").await.unwrap();
        let second: Option<u32> = store.get("counter").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some(41));
    }

    #[tokio::test]
    async fn test_put_overwrites_wholesale() {
        let (store, _temp) = test_store().await;

        store.put("list", &vec![1, 2, 3]).await.unwrap();
        store.put("list", &vec![9]).await.unwrap();

        let value: Option<Vec<i32>> = store.get("list").await.unwrap();
        assert_eq!(value, Some(vec![9]));
    }

    #[tokio::test]
    async fn test_values_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");

        {
            let store = KvStore::open(&path).await.unwrap();
            store.put("kept", &"value".to_string()).await.unwrap();
        }

        let store = KvStore::open(&path).await.unwrap();
        let value: Option<String> = store.get("kept").await.unwrap();
        assert_eq!(value, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_read_error() {
        let (store, _temp) = test_store().await;

        store.put("text", &"not a number".to_string()).await.unwrap();
        let result: Result<Option<u32>, StoreError> = store.get("text").await;

        assert!(matches!(result, Err(StoreError::Read(_, _))));
    }

    #[tokio::test]
    async fn test_newer_schema_version_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");

        KvStore::open(&path).await.unwrap();

        // Stamp a future version directly.
        let options = SqliteConnectOptions::new().filename(&path);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let result = KvStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
