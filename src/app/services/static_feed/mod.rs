//! Static feed store service
//!
//! This module owns the locally cached CTA static feed. The store loads the
//! cached GTFS tables wholesale into an immutable [`FeedSnapshot`]; queries
//! operate against one snapshot start-to-finish, so concurrent readers never
//! observe a partially refreshed feed.

use crate::app::models::{Route, ServiceCalendar, Stop, Trip};
use crate::config::Config;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub mod loader;
pub mod metadata;
pub mod parser;
pub mod refresh;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use metadata::{LoadStats, SnapshotMetadata};
pub use refresh::{FeedRefresher, RefreshOutcome};

/// Handle on the on-disk static feed cache
///
/// The store exclusively owns the cached tables. Reading produces an
/// [`Arc<FeedSnapshot>`] that is safe to share across callers; replacing the
/// cache is the refresh job's responsibility and always happens wholesale.
#[derive(Debug, Clone)]
pub struct StaticFeedStore {
    cache_dir: PathBuf,
}

impl StaticFeedStore {
    /// Create a store rooted at the configured cache directory
    pub fn new(config: &Config) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
        }
    }

    /// Path to the cache directory
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Load the cached feed into an immutable snapshot
    ///
    /// Fails with `Error::StoreUnavailable` when the cache directory or the
    /// required stops table is missing; malformed individual records are
    /// logged and counted in the returned [`LoadStats`], not fatal.
    pub async fn load(&self) -> Result<(Arc<FeedSnapshot>, LoadStats)> {
        let (snapshot, stats) = FeedSnapshot::load_from_dir(&self.cache_dir).await?;
        Ok((Arc::new(snapshot), stats))
    }
}

/// The entire locally cached dataset, normalized and immutable
///
/// Created wholesale by the loader and never mutated afterwards. All stop
/// records use the uniform [`Stop`] shape regardless of bus/train origin, and
/// direction codes are normalized at ingestion so queries never re-parse
/// description text.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Stops indexed by id; ordered map so iteration order is deterministic
    pub(crate) stops: BTreeMap<u32, Stop>,

    /// Routes indexed by normalized (uppercase) route id
    pub(crate) routes: HashMap<String, Route>,

    /// Scheduled trips
    pub(crate) trips: Vec<Trip>,

    /// Service calendar rows
    pub(crate) calendars: Vec<ServiceCalendar>,

    /// Bus route membership: normalized route id -> serviced stop ids
    pub(crate) route_stops: HashMap<String, HashSet<u32>>,

    /// Parent station id -> sorted child platform ids
    pub(crate) children: HashMap<u32, Vec<u32>>,

    /// Parent station id -> station name from the train station inventory
    pub(crate) station_names: HashMap<u32, String>,

    /// Upstream publish timestamp recorded by the refresh job, if known
    pub(crate) published: Option<String>,

    /// When this snapshot was loaded
    pub(crate) loaded_at: Instant,

    /// Directory the snapshot was loaded from
    pub(crate) cache_dir: PathBuf,
}

impl FeedSnapshot {
    /// Get a stop by id (O(log n) lookup)
    pub fn stop(&self, stop_id: u32) -> Option<&Stop> {
        self.stops.get(&stop_id)
    }

    /// Check if a stop exists in the snapshot
    pub fn contains_stop(&self, stop_id: u32) -> bool {
        self.stops.contains_key(&stop_id)
    }

    /// All stops, in ascending stop-id order
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    /// Total number of stops in the snapshot
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Get a route by id (case-insensitive)
    pub fn route(&self, route_id: &str) -> Option<&Route> {
        self.routes.get(&normalize_route_id(route_id))
    }

    /// Station name for a parent station, per the train station inventory
    pub fn station_name(&self, parent_id: u32) -> Option<&str> {
        self.station_names.get(&parent_id).map(String::as_str)
    }

    /// Child platform ids of a parent station, in ascending id order
    pub fn children_of(&self, parent_id: u32) -> &[u32] {
        self.children
            .get(&parent_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Bus routes servicing a stop, resolved through the route/stop transfer
    /// table, in ascending route-id order
    pub fn routes_for_stop(&self, stop_id: u32) -> Vec<String> {
        let mut routes: Vec<String> = self
            .route_stops
            .iter()
            .filter(|(_, stop_ids)| stop_ids.contains(&stop_id))
            .map(|(route_id, _)| route_id.clone())
            .collect();
        routes.sort();
        routes
    }

    /// Stop ids serviced by a bus route, per the transfer table
    pub fn stops_for_route(&self, route_id: &str) -> Option<&HashSet<u32>> {
        self.route_stops.get(&normalize_route_id(route_id))
    }

    /// Service ids active on the given date, per the calendar table
    pub fn service_ids_for_date(&self, date: NaiveDate) -> Vec<String> {
        self.calendars
            .iter()
            .filter(|calendar| calendar.is_active_on(date))
            .map(|calendar| calendar.service_id.clone())
            .collect()
    }

    /// Trips whose service id is active on the given date
    pub fn trips_for_date(&self, date: NaiveDate) -> Vec<&Trip> {
        let active: HashSet<String> = self.service_ids_for_date(date).into_iter().collect();
        self.trips
            .iter()
            .filter(|trip| active.contains(&trip.service_id))
            .collect()
    }

    /// Upstream publish timestamp of the cached feed, if recorded
    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }

    /// Snapshot metadata
    pub fn metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata {
            cache_dir: self.cache_dir.clone(),
            published: self.published.clone(),
            stop_count: self.stops.len(),
            route_count: self.routes.len(),
            trip_count: self.trips.len(),
            calendar_count: self.calendars.len(),
            loaded_at: self.loaded_at,
        }
    }

    /// Create an empty snapshot rooted at the given cache directory
    pub(crate) fn empty(cache_dir: PathBuf) -> Self {
        Self {
            stops: BTreeMap::new(),
            routes: HashMap::new(),
            trips: Vec::new(),
            calendars: Vec::new(),
            route_stops: HashMap::new(),
            children: HashMap::new(),
            station_names: HashMap::new(),
            published: None,
            loaded_at: Instant::now(),
            cache_dir,
        }
    }
}

/// Normalize a route id for lookups ("x49" and "X49" are the same route)
pub(crate) fn normalize_route_id(route_id: &str) -> String {
    route_id.trim().to_uppercase()
}

/// Convenience used by error paths that need a displayable cache path
pub(crate) fn display_path(path: &std::path::Path) -> String {
    path.to_string_lossy().to_string()
}

impl Error {
    pub(crate) fn missing_table(cache_dir: &std::path::Path, table: &str) -> Self {
        Error::store_unavailable(
            display_path(cache_dir),
            format!("Required table '{}' is missing from the cache", table),
        )
    }
}
