//! Closest-stops resolution engine
//!
//! Resolves the stops nearest to an origin, which may be a coordinate pair or
//! a free-text location handed to the geocoder. Bus and train stops are
//! ranked independently and the result is always the bus list followed by the
//! train list, each truncated to the configured limit.

use crate::app::adapters::geocoder::Geocoder;
use crate::app::models::{Direction, Point, RankedStop};
use crate::app::services::static_feed::FeedSnapshot;
use crate::app::services::stop_inventory::StopTypeFilter;
use crate::constants::DEFAULT_CLOSEST_STOPS_LIMIT;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;

pub mod distance;
pub mod resolver;

#[cfg(test)]
pub mod tests;

pub use distance::{distance, rank_by_distance};

/// Where a closest-stops query starts from
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    /// An explicit coordinate pair
    Point(Point),

    /// A free-text location resolved through the geocoder
    Query(String),
}

impl From<Point> for Origin {
    fn from(point: Point) -> Self {
        Origin::Point(point)
    }
}

impl From<&str> for Origin {
    fn from(query: &str) -> Self {
        Origin::Query(query.to_string())
    }
}

impl From<String> for Origin {
    fn from(query: String) -> Self {
        Origin::Query(query)
    }
}

/// Per-side direction constraints
///
/// Bus and train directions are filtered independently because a single
/// journey often wants, say, northbound buses but either train platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionFilter {
    pub bus: Option<Direction>,
    pub train: Option<Direction>,
}

impl DirectionFilter {
    /// Apply the same direction to both sides
    pub fn uniform(direction: Direction) -> Self {
        Self {
            bus: Some(direction),
            train: Some(direction),
        }
    }
}

/// Options controlling a closest-stops query
#[derive(Debug, Clone)]
pub struct ClosestStopsOptions {
    /// Maximum results per stop type; with grouping enabled this bounds the
    /// number of parent stations instead
    pub limit: usize,

    /// Which side of the system to search
    pub stop_type: StopTypeFilter,

    /// Routes the stops must service (any match qualifies)
    pub route_ids: Vec<String>,

    /// Stop ids excluded from consideration
    pub exclude_stop_ids: HashSet<u32>,

    /// Direction constraints, applied after ranking and grouping
    pub directions: DirectionFilter,

    /// Rank train results by parent station and return every platform of the
    /// closest stations, keeping station platforms together
    pub group_child_stops: bool,

    /// Restrict train results to parent stations
    pub parent_stops_only: bool,

    /// Restrict train results to platform stops
    pub child_stops_only: bool,
}

impl Default for ClosestStopsOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CLOSEST_STOPS_LIMIT,
            stop_type: StopTypeFilter::Any,
            route_ids: Vec::new(),
            exclude_stop_ids: HashSet::new(),
            directions: DirectionFilter::default(),
            group_child_stops: false,
            parent_stops_only: false,
            child_stops_only: false,
        }
    }
}

impl ClosestStopsOptions {
    /// Set the per-type result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to one side of the system
    pub fn with_stop_type(mut self, stop_type: StopTypeFilter) -> Self {
        self.stop_type = stop_type;
        self
    }

    /// Require service on any of the given routes
    pub fn with_routes(mut self, route_ids: impl IntoIterator<Item = String>) -> Self {
        self.route_ids = route_ids.into_iter().collect();
        self
    }

    /// Require service on any route in a comma-separated list ("22,36,red")
    pub fn with_route_list(mut self, routes: &str) -> Self {
        self.route_ids = routes
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Exclude specific stop ids
    pub fn with_excluded(mut self, stop_ids: impl IntoIterator<Item = u32>) -> Self {
        self.exclude_stop_ids = stop_ids.into_iter().collect();
        self
    }

    /// Apply direction constraints
    pub fn with_directions(mut self, directions: DirectionFilter) -> Self {
        self.directions = directions;
        self
    }

    /// Group train platforms under their parent stations
    pub fn with_grouping(mut self) -> Self {
        self.group_child_stops = true;
        self
    }

    /// Restrict train results to parent stations
    pub fn parents_only(mut self) -> Self {
        self.parent_stops_only = true;
        self
    }

    /// Restrict train results to platform stops
    pub fn children_only(mut self) -> Self {
        self.child_stops_only = true;
        self
    }

    /// Reject structurally conflicting option combinations
    pub fn validate(&self) -> Result<()> {
        if self.parent_stops_only && self.child_stops_only {
            return Err(Error::invalid_filter(
                "parent_stops_only and child_stops_only are mutually exclusive",
            ));
        }
        if self.group_child_stops && self.parent_stops_only {
            return Err(Error::invalid_filter(
                "group_child_stops conflicts with parent_stops_only",
            ));
        }
        if self.group_child_stops && self.child_stops_only {
            return Err(Error::invalid_filter(
                "group_child_stops conflicts with child_stops_only",
            ));
        }
        Ok(())
    }
}

/// Resolves closest-stop queries against a feed snapshot
#[derive(Debug, Clone)]
pub struct ClosestStopsResolver<G> {
    snapshot: Arc<FeedSnapshot>,
    geocoder: G,
}

impl<G> ClosestStopsResolver<G> {
    /// Create a resolver over a loaded snapshot
    pub fn new(snapshot: Arc<FeedSnapshot>, geocoder: G) -> Self {
        Self { snapshot, geocoder }
    }

    /// The snapshot this resolver queries
    pub fn snapshot(&self) -> &Arc<FeedSnapshot> {
        &self.snapshot
    }
}

// Only the free-text origin path needs a geocoder
impl<G: Geocoder> ClosestStopsResolver<G> {
    /// Resolve the closest stops to an origin
    ///
    /// Geocoding failures and invalid option combinations propagate as
    /// errors; an origin with no qualifying stops yields an empty list.
    pub async fn closest_stops(
        &self,
        origin: impl Into<Origin>,
        options: &ClosestStopsOptions,
    ) -> Result<Vec<RankedStop>> {
        options.validate()?;

        let point = match origin.into() {
            Origin::Point(point) => point,
            Origin::Query(query) => self.geocoder.geocode(&query).await?,
        };

        Ok(self.resolve_at(point, options))
    }
}
