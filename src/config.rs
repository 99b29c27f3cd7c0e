//! Configuration management and validation.
//!
//! Provides the library-wide configuration: where the cached static feed
//! lives on disk, how the geocoding service is reached, and retry tuning for
//! the network-facing adapters.

use crate::constants::{
    GEOCODER_ENDPOINT, GEOCODER_RESULT_LIMIT, MAX_RETRY_ATTEMPTS, RETRY_DELAY_MS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the cached static feed tables
    pub cache_dir: PathBuf,

    /// Geocoder adapter settings
    pub geocoder: GeocoderConfig,
}

/// Geocoder adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim-compatible search endpoint
    pub endpoint: String,

    /// Maximum matches requested per query; the first match is used
    pub result_limit: usize,

    /// Bounded retries for transient network failures (not for zero results)
    pub max_retry_attempts: usize,

    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: GEOCODER_ENDPOINT.to_string(),
            result_limit: GEOCODER_RESULT_LIMIT,
            max_retry_attempts: MAX_RETRY_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Config {
    /// Create a configuration rooted at an explicit cache directory
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::configuration("Cache directory cannot be empty"));
        }

        if self.geocoder.endpoint.trim().is_empty() {
            return Err(Error::configuration("Geocoder endpoint cannot be empty"));
        }

        if self.geocoder.result_limit == 0 {
            return Err(Error::configuration(
                "Geocoder result limit must be at least 1",
            ));
        }

        // Zero attempts would skip the request loop entirely
        if self.geocoder.max_retry_attempts == 0 {
            return Err(Error::configuration(
                "Geocoder retry attempts must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Default cache directory under the platform data dir, falling back to a
/// relative path when no home directory is available
fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cta-transit")
        .join("cache")
}
