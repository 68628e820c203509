//! Remote JSON API source.

use std::time::Duration;

use async_trait::async_trait;
use safe_zone_models::{AirQualityReading, ClimateAlert, Coordinates, IssueReport, RecyclingCenter, Zone};

use crate::parsing::parse_list;
use crate::retry::{self, RetryPolicy};
use crate::{SafeZoneSource, SourceError};

/// Connection settings for [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// API base URL without a trailing slash (e.g. `https://api.example.org/api`).
    pub base_url: String,
    /// Optional bearer token sent with every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry behaviour for transient failures.
    pub retry: RetryPolicy,
}

impl HttpSourceConfig {
    /// Creates a config with the given base URL and default timeout/retry.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Fetches safe zone data from the remote JSON API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(mut config: HttpSourceConfig) -> Result<Self, SourceError> {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("safe-zone/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// The settings this source was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Full URL of an endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_list<T>(&self, path: &str, key: &str) -> Result<Vec<T>, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(path);
        log::debug!("GET {url}");
        let body = retry::send_json(&self.config.retry, || self.get(&url)).await?;
        let records = parse_list(body, key)?;
        log::debug!("GET {url}: {} records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl SafeZoneSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_safe_zones(&self) -> Result<Vec<Zone>, SourceError> {
        self.get_list("safe-zones", "safeZones").await
    }

    async fn fetch_climate_alerts(&self) -> Result<Vec<ClimateAlert>, SourceError> {
        self.get_list("climate-alerts", "alerts").await
    }

    async fn fetch_recycling_centers(&self) -> Result<Vec<RecyclingCenter>, SourceError> {
        self.get_list("recycling-centers", "centers").await
    }

    async fn fetch_air_quality(
        &self,
        location: Coordinates,
    ) -> Result<AirQualityReading, SourceError> {
        let url = self.endpoint("air-quality");
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
        ];
        log::debug!("GET {url} at {},{}", location.latitude, location.longitude);
        let body =
            retry::send_json(&self.config.retry, || self.get(&url).query(&query)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn submit_report(&self, report: &IssueReport) -> Result<(), SourceError> {
        let url = self.endpoint("reports");
        log::debug!("POST {url} report={}", report.id);
        retry::send_discarding_body(&self.config.retry, || {
            self.authorize(self.client.post(&url)).json(report)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let source = HttpSource::new(HttpSourceConfig::new("https://api.example.org/api//")).unwrap();
        assert_eq!(source.config().base_url, "https://api.example.org/api");
        assert_eq!(
            source.endpoint("/safe-zones"),
            "https://api.example.org/api/safe-zones"
        );
        assert_eq!(
            source.endpoint("air-quality"),
            "https://api.example.org/api/air-quality"
        );
    }

    #[test]
    fn default_config_retries() {
        let config = HttpSourceConfig::new("http://localhost");
        assert!(config.token.is_none());
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let config = HttpSourceConfig {
            timeout: Duration::from_millis(500),
            retry: RetryPolicy::none(),
            ..HttpSourceConfig::new("http://127.0.0.1:9")
        };
        let source = HttpSource::new(config).unwrap();
        assert!(source.fetch_safe_zones().await.is_err());
    }
}
