#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safe zone data service.
//!
//! [`SafeZoneService`] combines a [`safe_zone_source::SafeZoneSource`], a
//! persistent [`KeyValueStore`], and the scorer. Zones and alerts are read
//! through a two-level cache with a fixed time-to-live; when the source is
//! unreachable the service serves stale cache entries or built-in fallback
//! data instead of failing.

pub mod cache;
pub mod clock;
pub mod config;
pub mod fallback;
pub mod favorites;
pub mod query;
pub mod reports;
pub mod service;

use std::sync::Arc;

use safe_zone_database::{DbError, FileStore, KeyValueStore, MemoryStore, paths};
use safe_zone_source::SourceError;

pub use cache::{CacheEntry, CacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ServiceConfig, StorageBackend, StorageConfig};
pub use query::{NearbyZone, ZoneFilter, ZoneInsights, ZoneQuery};
pub use service::SafeZoneService;

/// Errors that can occur while building or running the service.
///
/// Public operations on [`SafeZoneService`] never return these; they are
/// logged and replaced by fallback values.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Opens the persistent store selected by `config`.
///
/// # Errors
///
/// * If the store cannot be opened
/// * If the `duckdb` backend is selected without the `duckdb` feature
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, ServiceError> {
    let data_dir = config.data_dir();
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::File => {
            let store = FileStore::open(paths::store_dir_in(&data_dir)).await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "duckdb")]
        StorageBackend::DuckDb => {
            let store = safe_zone_database::DuckDbStore::open(&paths::kv_db_path_in(&data_dir))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "duckdb"))]
        StorageBackend::DuckDb => Err(ConfigError::Invalid {
            field: "storage.backend",
            message: format!(
                "duckdb support is not compiled in (data dir {})",
                data_dir.display()
            ),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_memory_store() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            data_dir: None,
        };
        let store = open_store(&config).await.unwrap();
        store.set("favoriteSafeZones", "[]").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["favoriteSafeZones"]);
    }

    #[tokio::test]
    async fn opens_file_store_under_data_dir() {
        let dir = std::env::temp_dir().join(format!(
            "safe-zone-open-store-{}",
            uuid::Uuid::new_v4()
        ));
        let config = StorageConfig {
            backend: StorageBackend::File,
            data_dir: Some(dir.clone()),
        };
        let store = open_store(&config).await.unwrap();
        store.set("cache_safeZones", "[]").await.unwrap();
        assert!(dir.join("store").is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }
}
