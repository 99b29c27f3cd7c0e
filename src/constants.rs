//! Application constants for the CTA transit library
//!
//! This module contains the stop id namespace boundaries, upstream feed
//! locations, cached file names, and default values used throughout the crate.

// =============================================================================
// Stop ID Namespace
// =============================================================================

/// Stop id namespace boundaries as used by the CTA:
/// - `0..30000` are bus stops
/// - `30000..40000` are train platform stops (children)
/// - `40000..50000` are train parent stations
pub mod stop_id_ranges {
    /// First id of the train platform range
    pub const TRAIN_PLATFORM_MIN: u32 = 30_000;

    /// First id of the train parent-station range
    pub const TRAIN_PARENT_MIN: u32 = 40_000;

    /// One past the last valid train parent-station id
    pub const TRAIN_PARENT_MAX: u32 = 50_000;
}

// =============================================================================
// Upstream Feed Locations
// =============================================================================

/// CTA schedule data directory; the GTFS bundle link and its publish timestamp
/// are scraped from this page
pub const SCHEDULE_DATA_BASE: &str = "https://www.transitchicago.com/downloads/sch_data/";

/// The GTFS static feed bundle
pub const GTFS_FEED_URL: &str =
    "https://www.transitchicago.com/downloads/sch_data/google_transit.zip";

/// Route/stop transfer table (bus route membership per stop)
pub const STOP_TRANSFERS_URL: &str =
    "https://www.transitchicago.com/downloads/sch_data/CTA_STOP_XFERS.txt";

/// Train station inventory with per-line flags (City of Chicago data portal)
pub const TRAIN_STATIONS_URL: &str = "https://data.cityofchicago.org/resource/8pix-ypme.json";

/// Default Nominatim-compatible geocoding endpoint
pub const GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

// =============================================================================
// Cached File Names
// =============================================================================

/// GTFS text tables expected in the cache directory
pub const GTFS_STOPS_FILE: &str = "stops.txt";
pub const GTFS_ROUTES_FILE: &str = "routes.txt";
pub const GTFS_TRIPS_FILE: &str = "trips.txt";
pub const GTFS_CALENDAR_FILE: &str = "calendar.txt";

/// Train station inventory cached alongside the GTFS tables
pub const TRAIN_STATIONS_FILE: &str = "train_stations.csv";

/// Bus route/stop transfer table cached alongside the GTFS tables
pub const STOP_TRANSFERS_FILE: &str = "stop_transfers.csv";

/// Marker file recording the upstream publish timestamp of the cached feed
pub const FEED_UPDATED_MARKER: &str = "updated.txt";

/// Date format used in GTFS calendar start/end columns
pub const GTFS_DATE_FORMAT: &str = "%Y%m%d";

// =============================================================================
// Query Defaults and Retry Tuning
// =============================================================================

/// Default number of results returned by the closest-stops resolver
pub const DEFAULT_CLOSEST_STOPS_LIMIT: usize = 5;

/// Maximum results requested from the geocoding service per query
pub const GEOCODER_RESULT_LIMIT: usize = 5;

/// Retry constants for transient geocoder/network errors
pub const MAX_RETRY_ATTEMPTS: usize = 3;
pub const RETRY_DELAY_MS: u64 = 250;

/// Mean radius of the Earth in miles, for great-circle distances
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

// =============================================================================
// Helper Functions
// =============================================================================

/// Check whether a stop id falls in the bus namespace
pub fn is_bus_stop_id(stop_id: u32) -> bool {
    stop_id < stop_id_ranges::TRAIN_PLATFORM_MIN
}

/// Check whether a stop id falls in the train platform (child) namespace
pub fn is_train_platform_id(stop_id: u32) -> bool {
    (stop_id_ranges::TRAIN_PLATFORM_MIN..stop_id_ranges::TRAIN_PARENT_MIN).contains(&stop_id)
}

/// Check whether a stop id falls in the train parent-station namespace
pub fn is_train_parent_id(stop_id: u32) -> bool {
    (stop_id_ranges::TRAIN_PARENT_MIN..stop_id_ranges::TRAIN_PARENT_MAX).contains(&stop_id)
}
