//! Geocoding adapter
//!
//! Turns free-text locations into coordinates. The [`Geocoder`] trait is the
//! seam: the closest-stops resolver is generic over it, so tests substitute a
//! canned implementation and production uses the Nominatim-backed client.

use crate::app::models::Point;
use crate::config::GeocoderConfig;
use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves a free-text location to a coordinate pair
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// Resolve a query to a point, taking the first match
    ///
    /// A query with no matches is an error: the caller asked about a place
    /// that cannot be located, and an empty stop list would mask that.
    async fn geocode(&self, query: &str) -> Result<Point>;
}

/// Geocoder backed by a Nominatim-compatible search endpoint
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder from adapter settings
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cta-transit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::feed_download("Failed to build HTTP client", Some(e)))?;

        Ok(Self { client, config })
    }

    async fn fetch_places(&self, query: &str) -> Result<Vec<NominatimPlace>> {
        let mut last_error = None;
        let limit = self.config.result_limit.to_string();

        // Transient transport and server errors are retried; an empty result
        // set is a definitive answer and never retried
        for attempt in 1..=self.config.max_retry_attempts {
            let response = self
                .client
                .get(&self.config.endpoint)
                .query(&[
                    ("q", query),
                    ("format", "jsonv2"),
                    ("limit", limit.as_str()),
                ])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);

            match response {
                Ok(response) => {
                    return response.json::<Vec<NominatimPlace>>().await.map_err(|e| {
                        Error::geocode(query, format!("Malformed geocoder response: {}", e))
                    });
                }
                Err(e) => {
                    warn!(
                        "Geocoder request failed (attempt {}/{}): {}",
                        attempt, self.config.max_retry_attempts, e
                    );
                    last_error = Some(e);
                    if attempt < self.config.max_retry_attempts {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
            }
        }

        Err(Error::geocode(
            query,
            format!(
                "Geocoding service unreachable after {} attempts: {}",
                self.config.max_retry_attempts,
                last_error.map(|e| e.to_string()).unwrap_or_default()
            ),
        ))
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Point> {
        let places = self.fetch_places(query).await?;

        let Some(first) = places.first() else {
            return Err(Error::geocode(query, "No matching location found"));
        };

        debug!("Geocoded '{}' to '{}'", query, first.display_name);
        first.to_point(query)
    }
}

/// One match from a Nominatim search response
///
/// Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl NominatimPlace {
    pub(crate) fn to_point(&self, query: &str) -> Result<Point> {
        let latitude = self.lat.parse::<f64>().map_err(|_| {
            Error::geocode(query, format!("Unparseable latitude '{}'", self.lat))
        })?;
        let longitude = self.lon.parse::<f64>().map_err(|_| {
            Error::geocode(query, format!("Unparseable longitude '{}'", self.lon))
        })?;
        Ok(Point::new(latitude, longitude))
    }
}
