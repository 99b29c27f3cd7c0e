//! Stop inventory accessor
//!
//! Read-only filtered views over a feed snapshot's stops. The inventory
//! never computes distances; it answers "which stops qualify" and leaves
//! ranking to the closest-stops resolver.

use crate::app::models::Direction;
use crate::app::services::static_feed::FeedSnapshot;
use std::collections::HashSet;

pub mod query;

#[cfg(test)]
pub mod tests;

/// Which side of the system a stop query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopTypeFilter {
    Bus,
    Train,
    #[default]
    Any,
}

/// Declarative stop selection criteria
///
/// All criteria are conjunctive: a stop must satisfy every populated field.
/// Within `route_ids`, matching any one route qualifies the stop.
#[derive(Debug, Clone, Default)]
pub struct StopFilter {
    /// Restrict results to bus stops, train stops, or both
    pub stop_type: StopTypeFilter,

    /// Routes the stop must service (any match qualifies); empty matches all
    pub route_ids: Vec<String>,

    /// Stop ids excluded from results
    pub exclude_stop_ids: HashSet<u32>,

    /// Direction the stop must serve; stops with an unknown direction never
    /// match a direction filter
    pub direction: Option<Direction>,
}

impl StopFilter {
    /// A filter matching every stop
    pub fn any() -> Self {
        Self::default()
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

    /// Exclude specific stop ids
    pub fn with_excluded(mut self, stop_ids: impl IntoIterator<Item = u32>) -> Self {
        self.exclude_stop_ids = stop_ids.into_iter().collect();
        self
    }

    /// Require a direction of travel
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Filtered read access to a snapshot's stops
#[derive(Debug, Clone, Copy)]
pub struct StopInventory<'a> {
    snapshot: &'a FeedSnapshot,
}

impl<'a> StopInventory<'a> {
    /// Create an inventory over a loaded snapshot
    pub fn new(snapshot: &'a FeedSnapshot) -> Self {
        Self { snapshot }
    }

    /// The underlying snapshot
    pub fn snapshot(&self) -> &'a FeedSnapshot {
        self.snapshot
    }
}
