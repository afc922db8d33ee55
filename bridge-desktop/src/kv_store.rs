//! Key-value storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed string slots, the desktop stand-in for `localStorage`.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Open (or create) the store at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        // SQLite URLs want forward slashes
        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let db_url = format!("sqlite://{}?mode=rwc", path_str);

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;
        Self::create_table(&pool).await?;

        debug!(
            file = ?db_path.file_name().unwrap_or_default(),
            "Initialized key-value store"
        );
        Ok(Self { pool })
    }

    /// In-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;
        Self::create_table(&pool).await?;

        Ok(Self { pool })
    }

    /// `<data dir>/playlist-core/storage.db`, falling back to the temp dir.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("playlist-core")
            .join("storage.db")
    }

    async fn create_table(pool: &SqlitePool) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to read key: {}", e)))?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.message().contains("full") => {
                BridgeError::QuotaExceeded(db.message().to_string())
            }
            other => BridgeError::OperationFailed(format!("Failed to write key: {}", other)),
        })?;

        debug!(key = key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to delete key: {}", e)))?;

        debug!(key = key, "Deleted value");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to check key: {}", e)))?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_operations() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store.set_string("musicPlayerPlaylist", "[]").await.unwrap();
        assert_eq!(
            store.get_string("musicPlayerPlaylist").await.unwrap(),
            Some("[]".to_string())
        );
        assert!(store.has_key("musicPlayerPlaylist").await.unwrap());

        store.delete("musicPlayerPlaylist").await.unwrap();
        assert_eq!(store.get_string("musicPlayerPlaylist").await.unwrap(), None);
        assert!(!store.has_key("musicPlayerPlaylist").await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store.set_string("musicPlayerCurrentIndex", "0").await.unwrap();
        store.set_string("musicPlayerCurrentIndex", "3").await.unwrap();

        assert_eq!(
            store.get_string("musicPlayerCurrentIndex").await.unwrap(),
            Some("3".to_string())
        );
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let path = std::env::temp_dir()
            .join(format!("kv-store-{}", uuid::Uuid::new_v4()))
            .join("storage.db");

        {
            let store = SqliteKeyValueStore::new(path.clone()).await.unwrap();
            store.set_string("slot", "value").await.unwrap();
        }

        let reopened = SqliteKeyValueStore::new(path.clone()).await.unwrap();
        assert_eq!(
            reopened.get_string("slot").await.unwrap(),
            Some("value".to_string())
        );

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }
}
