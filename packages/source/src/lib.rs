#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Remote data sources for safe zones, climate alerts, recycling centers,
//! air quality, and issue report submission.
//!
//! Each backend implements the [`SafeZoneSource`] trait. [`HttpSource`]
//! talks to the remote JSON API; [`SimulatedSource`] serves a fixed
//! in-process dataset and can be told to fail, which makes it the source of
//! choice for offline use and tests.

pub mod http;
pub mod parsing;
pub mod retry;
pub mod simulated;

use async_trait::async_trait;
use safe_zone_models::{AirQualityReading, ClimateAlert, Coordinates, IssueReport, RecyclingCenter, Zone};

pub use http::{HttpSource, HttpSourceConfig};
pub use retry::RetryPolicy;
pub use simulated::SimulatedSource;

/// Errors that can occur while talking to a data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response: {message}")]
    Unexpected {
        /// Description of what went wrong.
        message: String,
    },

    /// The source is unreachable.
    #[error("Source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait that all safe zone data sources must implement.
///
/// Fetches return raw records. Scoring, caching, and fallback handling are
/// the caller's job.
#[async_trait]
pub trait SafeZoneSource: Send + Sync {
    /// Returns a short identifier for this source (e.g., `"http"`).
    fn name(&self) -> &str;

    /// Fetches all safe zone records.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails.
    async fn fetch_safe_zones(&self) -> Result<Vec<Zone>, SourceError>;

    /// Fetches active climate alerts.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails.
    async fn fetch_climate_alerts(&self) -> Result<Vec<ClimateAlert>, SourceError>;

    /// Fetches the full recycling center catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails.
    async fn fetch_recycling_centers(&self) -> Result<Vec<RecyclingCenter>, SourceError>;

    /// Fetches the current air quality reading at a location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails.
    async fn fetch_air_quality(
        &self,
        location: Coordinates,
    ) -> Result<AirQualityReading, SourceError>;

    /// Submits an issue report. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the submission fails.
    async fn submit_report(&self, report: &IssueReport) -> Result<(), SourceError>;
}
