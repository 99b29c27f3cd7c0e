//! CTA Transit Library
//!
//! A Rust client library for Chicago Transit Authority data built around a
//! locally cached copy of the CTA static GTFS feed.
//!
//! This library provides tools for:
//! - Loading and normalizing the cached GTFS feed into an immutable snapshot
//! - Querying the stop inventory with type/route/direction filters
//! - Ranking stops by great-circle distance from a point
//! - Resolving the closest stops to a coordinate or free-text location,
//!   including parent-station grouping for train platforms
//! - Refreshing the cached feed when the upstream publish timestamp changes

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod closest_stops;
        pub mod static_feed;
        pub mod stop_inventory;
    }
    pub mod adapters {
        pub mod geocoder;
    }
}

// Re-export commonly used types
pub use app::adapters::geocoder::{Geocoder, NominatimGeocoder};
pub use app::models::{Direction, Point, RankedStop, Stop, StopType, TrainLine};
pub use app::services::closest_stops::{
    ClosestStopsOptions, ClosestStopsResolver, DirectionFilter, Origin,
};
pub use app::services::static_feed::{
    FeedRefresher, FeedSnapshot, RefreshOutcome, StaticFeedStore,
};
pub use app::services::stop_inventory::{StopFilter, StopInventory, StopTypeFilter};
pub use config::{Config, GeocoderConfig};

/// Result type alias for CTA transit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CTA transit operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error in a feed table
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Free-text location could not be resolved to a point
    #[error("Geocoding failed for query '{query}': {message}")]
    Geocode { query: String, message: String },

    /// Structurally conflicting filter options
    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    /// Static feed cache is missing or unreadable
    #[error("Static feed store unavailable at '{path}': {message}")]
    StoreUnavailable { path: String, message: String },

    /// Feed download or upstream check failed
    #[error("Feed download error: {message}")]
    FeedDownload {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a geocoding error
    pub fn geocode(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Geocode {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create a store unavailable error
    pub fn store_unavailable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a feed download error
    pub fn feed_download(message: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        Self::FeedDownload {
            message: message.into(),
            source,
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::FeedDownload {
            message: "HTTP request failed".to_string(),
            source: Some(error),
        }
    }
}
