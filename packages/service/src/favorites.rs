//! Persisted list of favorite zone ids.

use std::sync::Arc;

use safe_zone_database::{DbError, KeyValueStore, get_json, set_json};
use safe_zone_models::ZoneId;
use tokio::sync::Mutex;

/// Storage key of the favorites list.
pub const FAVORITES_KEY: &str = "favoriteSafeZones";

/// Deduplicated, insertion-ordered favorite ids.
///
/// Mutations are read-modify-write under a lock so concurrent adds from the
/// same process cannot lose each other's ids.
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Creates a favorites list over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Lists favorite ids in the order they were added.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read or holds a malformed list
    pub async fn list(&self) -> Result<Vec<ZoneId>, DbError> {
        Ok(get_json(self.store.as_ref(), FAVORITES_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Adds `id`. Returns `false` if it was already a favorite.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read or written
    pub async fn add(&self, id: &ZoneId) -> Result<bool, DbError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.list().await?;
        if ids.contains(id) {
            log::debug!("favorite {id} already present");
            return Ok(false);
        }
        ids.push(id.clone());
        set_json(self.store.as_ref(), FAVORITES_KEY, &ids).await?;
        Ok(true)
    }

    /// Removes `id`. Returns `false` if it was not a favorite.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read or written
    pub async fn remove(&self, id: &ZoneId) -> Result<bool, DbError> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.list().await?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() == before {
            log::debug!("favorite {id} not present");
            return Ok(false);
        }
        set_json(self.store.as_ref(), FAVORITES_KEY, &ids).await?;
        Ok(true)
    }
}
