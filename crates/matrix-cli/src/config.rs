//! Configuration
//!
//! Read from TOML. Every section and field is optional:
//!
//! ```toml
//! [payment]
//! base_url = "https://matrix-backend.onrender.com"
//! timeout_secs = 10
//! max_retries = 2
//! initial_backoff_ms = 300
//! max_backoff_ms = 2000
//!
//! [storage]
//! path = "matrix-client.json"
//!
//! [corpus]
//! personal = "data/personal.json"
//! compatibility = "data/compatibility.json"
//!
//! [forecast]
//! fallback_point = "vpoint"
//!
//! [[reduction.overrides]]
//! min = 23
//! max = 23
//! output = 5
//! ```

use matrix_payment::{RetryPolicy, DEFAULT_BASE_URL};
use matrix_points::{PointCalculator, PointKey, ReductionRules};
use matrix_render::DEFAULT_FORECAST_FALLBACK;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "matrix.toml";

/// Environment variable overriding `payment.base_url`
pub const BACKEND_URL_ENV: &str = "MATRIX_BACKEND_URL";

/// Config loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid config TOML
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Payment backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentConfig {
    /// Backend base URL
    pub base_url: String,
    /// Deadline per attempt
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Longest delay between attempts
    pub max_backoff_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_retries: 2,
            initial_backoff_ms: 300,
            max_backoff_ms: 2000,
        }
    }
}

impl PaymentConfig {
    /// Retry policy for backend calls
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(self.max_retries)
            .with_initial_backoff(Duration::from_millis(self.initial_backoff_ms))
            .with_max_backoff(Duration::from_millis(self.max_backoff_ms))
            .with_attempt_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Client state file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// JSON file holding grant and pending payment entries
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("matrix-client.json"),
        }
    }
}

/// Text corpus files; a missing entry renders every sphere as no-data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// Personal report texts
    pub personal: Option<PathBuf>,
    /// Compatibility report texts
    pub compatibility: Option<PathBuf>,
}

/// Year sphere settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Point shown when no forecast band matches
    pub fallback_point: PointKey,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            fallback_point: DEFAULT_FORECAST_FALLBACK,
        }
    }
}

/// Reduction exceptions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReductionConfig {
    /// Ordered override table
    pub overrides: ReductionRules,
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// Payment backend
    pub payment: PaymentConfig,
    /// Client state
    pub storage: StorageConfig,
    /// Text corpora
    pub corpus: CorpusConfig,
    /// Year sphere
    pub forecast: ForecastConfig,
    /// Reduction exceptions
    pub reduction: ReductionConfig,
}

impl MatrixConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `toml::de::Error` for malformed or unknown fields.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a config file
    ///
    /// # Errors
    /// `ConfigError` when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit`, else `matrix.toml` if present, else defaults
    ///
    /// # Errors
    /// `ConfigError` when a chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    /// Apply `MATRIX_BACKEND_URL` if set
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(BACKEND_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => self.with_backend_url(url.trim()),
            _ => self,
        }
    }

    /// With payment backend URL
    #[inline]
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.payment.base_url = url.into();
        self
    }

    /// With client state file
    #[inline]
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.path = path.into();
        self
    }

    /// Point calculator using the configured override table
    #[must_use]
    pub fn calculator(&self) -> PointCalculator {
        PointCalculator::new(self.reduction.overrides.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_points::MainPoint;

    #[test]
    fn empty_text_is_default() {
        assert_eq!(MatrixConfig::from_toml_str("").unwrap(), MatrixConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = MatrixConfig::from_toml_str(
            "[payment]\nmax_retries = 5\n\n[forecast]\nfallback_point = \"apoint\"\n",
        )
        .unwrap();
        assert_eq!(config.payment.max_retries, 5);
        assert_eq!(config.payment.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.forecast.fallback_point, PointKey::Main(MainPoint::A));
        assert_eq!(config.payment.retry_policy().max_retries(), 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(MatrixConfig::from_toml_str("[payment]\nbase = \"x\"\n").is_err());
        assert!(MatrixConfig::from_toml_str("[forecast]\nfallback_point = \"zpoint\"\n").is_err());
    }

    #[test]
    fn override_table_feeds_calculator() {
        let config = MatrixConfig::from_toml_str(
            "[[reduction.overrides]]\nmin = 19\nmax = 19\noutput = 3\n",
        )
        .unwrap();
        assert_eq!(config.reduction.overrides.overrides().len(), 1);
        assert_eq!(config.calculator().rules().reduce(19).value(), 3);
    }

    #[test]
    fn inverted_override_range_is_rejected() {
        assert!(MatrixConfig::from_toml_str(
            "[[reduction.overrides]]\nmin = 30\nmax = 20\noutput = 3\n"
        )
        .is_err());
    }
}
