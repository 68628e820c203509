#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistent key-value storage for cached data, favorites, and reports.
//!
//! Values are JSON strings keyed by short identifiers such as
//! `cache_safeZones` or `favoriteSafeZones`. Every write replaces the whole
//! value. Three backends implement [`KeyValueStore`]:
//!
//! * [`FileStore`]: one JSON file per key in a data directory
//! * [`MemoryStore`]: in-process map for tests and ephemeral sessions
//! * `DuckDbStore`: a single `kv_store` table (behind the `duckdb` feature)

pub mod file;
pub mod memory;
pub mod paths;

#[cfg(feature = "duckdb")]
pub mod duckdb_store;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(feature = "duckdb")]
pub use duckdb_store::DuckDbStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value is not valid JSON for the requested type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `DuckDB` error.
    #[cfg(feature = "duckdb")]
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Key contains characters the backend cannot store.
    #[error("Invalid key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// The backend refused the operation.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// String-keyed store of JSON values.
///
/// Implementations must replace values atomically: a reader sees either
/// the old value or the new one, never a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, DbError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), DbError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), DbError>;

    /// Lists all stored keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read.
    async fn keys(&self) -> Result<Vec<String>, DbError>;
}

/// Reads and deserializes the value stored under `key`.
///
/// # Errors
///
/// Returns [`DbError`] if the read fails or the value does not
/// deserialize into `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, DbError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
///
/// # Errors
///
/// Returns [`DbError`] if serialization or the write fails.
pub async fn set_json<T: Serialize + Sync + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), DbError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Returns `true` if `key` is safe to use as a storage key on every
/// backend: non-empty, ASCII alphanumerics plus `_`, `-` and `.`, and not
/// starting with `.`.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub(crate) fn validate_key(key: &str) -> Result<(), DbError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(DbError::InvalidKey {
            key: key.to_string(),
        })
    }
}
