//! Directory-backed key-value store.
//!
//! Each key lives in `<dir>/<key>.json`. Writes go to a hidden temporary
//! file in the same directory which is then renamed over the target, so a
//! reader never observes a half-written value.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::{DbError, KeyValueStore, validate_key};

const EXTENSION: &str = "json";

/// A [`KeyValueStore`] that stores one JSON file per key.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileStore {
    /// Opens (or creates) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        log::debug!("Opened file store at {}", dir.display());
        Ok(Self {
            dir,
            write_seq: AtomicU64::new(0),
        })
    }

    /// Directory holding the store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DbError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let path = self.path_for(key)?;
        let temp = self.temp_path_for(key);

        if let Err(e) = tokio::fs::write(&temp, value).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(e.into());
        }

        log::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, DbError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && crate::is_valid_key(stem)
            {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store(name: &str) -> FileStore {
        let dir = std::env::temp_dir().join(format!(
            "safe_zone_file_store_{name}_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        FileStore::open(dir).await.unwrap()
    }

    async fn cleanup(store: FileStore) {
        tokio::fs::remove_dir_all(store.dir()).await.ok();
    }

    #[tokio::test]
    async fn round_trips_values() {
        let store = temp_store("round_trip").await;
        assert_eq!(store.get("cache_safeZones").await.unwrap(), None);

        store.set("cache_safeZones", r#"{"data":[]}"#).await.unwrap();
        assert_eq!(
            store.get("cache_safeZones").await.unwrap().as_deref(),
            Some(r#"{"data":[]}"#)
        );

        store.set("cache_safeZones", "[1]").await.unwrap();
        assert_eq!(
            store.get("cache_safeZones").await.unwrap().as_deref(),
            Some("[1]")
        );
        cleanup(store).await;
    }

    #[tokio::test]
    async fn lists_keys_without_temp_files() {
        let store = temp_store("keys").await;
        store.set("favoriteSafeZones", "[]").await.unwrap();
        store.set("cache_climateAlerts", "{}").await.unwrap();
        tokio::fs::write(store.dir().join(".stray.tmp"), "x")
            .await
            .unwrap();

        assert_eq!(
            store.keys().await.unwrap(),
            vec!["cache_climateAlerts", "favoriteSafeZones"]
        );
        cleanup(store).await;
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = temp_store("remove").await;
        store.set("k", "1").await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        cleanup(store).await;
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let store = temp_store("invalid").await;
        assert!(matches!(
            store.set("../outside", "1").await,
            Err(DbError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.get("a/b").await,
            Err(DbError::InvalidKey { .. })
        ));
        cleanup(store).await;
    }

    #[tokio::test]
    async fn reopening_sees_previous_writes() {
        let store = temp_store("reopen").await;
        store.set("cache_userReports", "[]").await.unwrap();
        let reopened = FileStore::open(store.dir().to_path_buf()).await.unwrap();
        assert_eq!(
            reopened.get("cache_userReports").await.unwrap().as_deref(),
            Some("[]")
        );
        cleanup(store).await;
    }
}
