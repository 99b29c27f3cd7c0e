//! Fixtures for closest-stops tests

pub mod distance_tests;

use crate::app::adapters::geocoder::Geocoder;
use crate::app::models::Point;
use crate::app::services::closest_stops::ClosestStopsResolver;
use crate::app::services::static_feed::FeedSnapshot;
use crate::app::services::static_feed::tests as feed_fixtures;
use crate::{Error, Result};
use std::sync::Arc;

/// An origin just west of the Addison station and the Clark & Addison stops
pub const WRIGLEYVILLE: Point = Point {
    latitude: 41.947,
    longitude: -87.6555,
};

/// Geocoder that resolves every query to a fixed point
pub struct FixedGeocoder(pub Point);

impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Point> {
        Ok(self.0)
    }
}

/// Geocoder that fails every query
pub struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    async fn geocode(&self, query: &str) -> Result<Point> {
        Err(Error::geocode(query, "No matching location found"))
    }
}

pub async fn snapshot() -> Arc<FeedSnapshot> {
    let cache = feed_fixtures::synthetic_cache();
    let (snapshot, _) = FeedSnapshot::load_from_dir(cache.path())
        .await
        .expect("load synthetic cache");
    Arc::new(snapshot)
}

/// Resolver whose geocoder always answers with the Wrigleyville origin
pub async fn resolver() -> ClosestStopsResolver<FixedGeocoder> {
    ClosestStopsResolver::new(snapshot().await, FixedGeocoder(WRIGLEYVILLE))
}
