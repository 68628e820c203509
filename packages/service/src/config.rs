//! Service configuration.
//!
//! Settings come from a TOML file, falling back to the defaults embedded
//! from `config/default.toml`, and are then adjusted by environment
//! variables. Fields missing from a user file keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use safe_zone_scoring::{ScoreWeights, Scorer, ScoringError};
use safe_zone_source::{HttpSourceConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Overrides the API base URL.
pub const ENV_API_URL: &str = "SAFE_ZONE_API_URL";
/// Sets the API bearer token.
pub const ENV_API_TOKEN: &str = "SAFE_ZONE_API_TOKEN";
/// Overrides the local data directory.
pub const ENV_DATA_DIR: &str = "SAFE_ZONE_DATA_DIR";
/// Path of a user config file.
pub const ENV_CONFIG: &str = "SAFE_ZONE_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ServiceConfig`].
    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Score weights are invalid.
    #[error(transparent)]
    Weights(#[from] ScoringError),

    /// A setting is out of range.
    #[error("Invalid setting {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to.
    pub base_url: String,
    /// Optional bearer token. Usually supplied through the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a transient failure.
    pub max_retries: u32,
    /// First retry delay in milliseconds, doubled per retry.
    pub retry_base_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a cached entry stays fresh.
    pub ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_minutes: 30 }
    }
}

/// Proximity search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    /// Radius used when the caller does not give one.
    pub default_radius_km: f64,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 5.0,
        }
    }
}

/// Which persistent store to use.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key.
    #[default]
    File,
    /// Nothing survives the process.
    Memory,
    /// A `DuckDB` database file (requires the `duckdb` feature).
    DuckDb,
}

/// Local storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store implementation.
    pub backend: StorageBackend,
    /// Data directory. Defaults to `data/` in the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(safe_zone_database::paths::data_dir)
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Remote API.
    pub api: ApiConfig,
    /// Cache.
    pub cache: CacheConfig,
    /// Proximity search.
    pub nearby: NearbyConfig,
    /// Local storage.
    pub storage: StorageConfig,
    /// Score factor weights.
    pub weights: ScoreWeights,
}

impl ServiceConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// * If the TOML is malformed
    /// * If any setting fails [`ServiceConfig::validate`]
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// * If the embedded TOML is invalid
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Loads `path` if given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the TOML is malformed or a setting is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            log::debug!("{ENV_API_URL} overrides api.base_url");
            self.api.base_url = url;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Invalid`] for an out-of-range setting
    /// * [`ConfigError::Weights`] if the weights are invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api.base_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        if self.cache.ttl_minutes == 0 {
            return Err(ConfigError::Invalid {
                field: "cache.ttl_minutes",
                message: "must be positive".to_string(),
            });
        }
        let radius = self.nearby.default_radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "nearby.default_radius_km",
                message: format!("must be a positive distance, got {radius}"),
            });
        }
        self.weights.validate()?;
        Ok(())
    }

    /// Cache time-to-live.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_minutes.saturating_mul(60))
    }

    /// Builds a scorer with the configured weights.
    ///
    /// # Errors
    ///
    /// * If the weights are invalid
    pub fn scorer(&self) -> Result<Scorer, ConfigError> {
        Ok(Scorer::with_weights(self.weights)?)
    }

    /// Connection settings for the HTTP source.
    #[must_use]
    pub fn http_source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.api.base_url.clone(),
            token: self.api.token.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            retry: RetryPolicy {
                max_retries: self.api.max_retries,
                base_delay: Duration::from_millis(self.api.retry_base_delay_ms),
            },
        }
    }
}
