//! Locally persisted issue reports.

use std::sync::Arc;

use safe_zone_database::{DbError, KeyValueStore};
use safe_zone_models::IssueReport;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cache::{CacheEntry, storage_key};
use crate::clock::Clock;

/// Logical cache key of the report list. Stored as `cache_userReports`.
pub const REPORTS_KEY: &str = "userReports";

/// Key holding the raw bytes of a report list that could not be parsed.
pub const CORRUPT_REPORTS_KEY: &str = "userReports_corrupt";

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredReports {
    Entry(CacheEntry<Vec<IssueReport>>),
    Bare(Vec<IssueReport>),
}

impl From<StoredReports> for Vec<IssueReport> {
    fn from(stored: StoredReports) -> Self {
        match stored {
            StoredReports::Entry(entry) => entry.data,
            StoredReports::Bare(reports) => reports,
        }
    }
}

/// Append-only list of reports the user has filed.
///
/// The list is never expired, but [`crate::CacheStore::clear`] removes it
/// along with every other `cache_` key.
pub struct ReportStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore").finish_non_exhaustive()
    }
}

impl ReportStore {
    /// Creates a report list over `store`, timestamped by `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// All persisted reports, oldest first.
    ///
    /// A malformed stored list is logged and read as empty.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read
    pub async fn list(&self) -> Result<Vec<IssueReport>, DbError> {
        let Some(raw) = self.store.get(&storage_key(REPORTS_KEY)).await? else {
            return Ok(Vec::new());
        };
        Ok(parse(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring malformed report list: {e}");
            Vec::new()
        }))
    }

    /// Appends `report` to the persisted list.
    ///
    /// A malformed stored list is copied to [`CORRUPT_REPORTS_KEY`] before
    /// being replaced, so its bytes are never dropped.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read or written
    pub async fn append(&self, report: IssueReport) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        let mut reports = match self.store.get(&storage_key(REPORTS_KEY)).await? {
            None => Vec::new(),
            Some(raw) => match parse(&raw) {
                Ok(reports) => reports,
                Err(e) => {
                    log::warn!("malformed report list moved to {CORRUPT_REPORTS_KEY}: {e}");
                    self.store.set(CORRUPT_REPORTS_KEY, &raw).await?;
                    Vec::new()
                }
            },
        };
        reports.push(report);
        let entry = CacheEntry {
            data: reports,
            timestamp: self.clock.now_millis(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&storage_key(REPORTS_KEY), &raw).await
    }
}

fn parse(raw: &str) -> Result<Vec<IssueReport>, serde_json::Error> {
    serde_json::from_str::<StoredReports>(raw).map(Into::into)
}
