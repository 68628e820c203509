//! Key-value store in a single `DuckDB` table.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use duckdb::{Connection, OptionalExt};

use crate::{DbError, KeyValueStore, validate_key};

/// A [`KeyValueStore`] backed by a `kv_store` table in a `DuckDB` file.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for DuckDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbStore").finish_non_exhaustive()
    }
}

impl DuckDbStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        log::debug!("Opened DuckDB key-value store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let conn = self.conn.lock().map_err(|e| DbError::Unavailable {
            message: format!("connection lock poisoned: {e}"),
        })?;
        f(&conn)
    }
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for DuckDbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        validate_key(key)?;
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?",
                    duckdb::params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        validate_key(key)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?, ?, CURRENT_TIMESTAMP)
                 ON CONFLICT (key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
                duckdb::params![key, value],
            )?;
            Ok(())
        })
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        validate_key(key)?;
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?", duckdb::params![key])?;
            Ok(())
        })
    }

    async fn keys(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
            let mut rows = stmt.query([])?;
            let mut keys = Vec::new();
            while let Some(row) = rows.next()? {
                keys.push(row.get(0)?);
            }
            Ok(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upserts_and_lists() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.set("cache_safeZones", "[1]").await.unwrap();
        store.set("cache_safeZones", "[2]").await.unwrap();
        store.set("favoriteSafeZones", "[]").await.unwrap();

        assert_eq!(
            store.get("cache_safeZones").await.unwrap().as_deref(),
            Some("[2]")
        );
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["cache_safeZones", "favoriteSafeZones"]
        );

        store.remove("cache_safeZones").await.unwrap();
        assert_eq!(store.get("cache_safeZones").await.unwrap(), None);
    }
}
