//! Ranking pipeline for closest-stops queries
//!
//! Each side of the system runs the same pipeline independently: select
//! candidates, rank by distance, apply the train station hierarchy, filter by
//! direction, truncate. Bus results always precede train results and the two
//! lists are never interleaved.

use crate::app::models::{Point, RankedStop, StopType};
use crate::app::services::closest_stops::{ClosestStopsOptions, ClosestStopsResolver, distance};
use crate::app::services::stop_inventory::{StopFilter, StopInventory, StopTypeFilter};
use std::collections::HashSet;
use tracing::debug;

impl<G> ClosestStopsResolver<G> {
    /// Rank the stops closest to a resolved coordinate
    pub(crate) fn resolve_at(&self, origin: Point, options: &ClosestStopsOptions) -> Vec<RankedStop> {
        let mut results = Vec::new();

        if options.stop_type != StopTypeFilter::Train {
            results.extend(self.resolve_side(origin, options, StopType::Bus));
        }
        if options.stop_type != StopTypeFilter::Bus {
            results.extend(self.resolve_side(origin, options, StopType::Train));
        }

        debug!(
            "Resolved {} stops near ({:.5}, {:.5})",
            results.len(),
            origin.latitude,
            origin.longitude
        );
        results
    }

    fn resolve_side(
        &self,
        origin: Point,
        options: &ClosestStopsOptions,
        side: StopType,
    ) -> Vec<RankedStop> {
        let snapshot = self.snapshot();
        let inventory = StopInventory::new(snapshot);

        let filter = StopFilter {
            stop_type: match side {
                StopType::Bus => StopTypeFilter::Bus,
                StopType::Train => StopTypeFilter::Train,
            },
            route_ids: options.route_ids.clone(),
            exclude_stop_ids: options.exclude_stop_ids.clone(),
            // Direction filtering happens after ranking and grouping so that
            // station grouping sees every platform of a candidate station
            direction: None,
        };

        let mut candidates = inventory.stops(&filter);

        if side == StopType::Train {
            if options.parent_stops_only {
                candidates.retain(|stop| stop.is_parent_station());
            }
            if options.child_stops_only || options.group_child_stops {
                candidates.retain(|stop| stop.is_train_platform());
            }
        }

        let mut ranked = distance::rank_by_distance(candidates, origin);

        if side == StopType::Train && options.group_child_stops {
            ranked = self.group_by_station(ranked, origin, options.limit);
        }

        let direction = match side {
            StopType::Bus => options.directions.bus,
            StopType::Train => options.directions.train,
        };
        if let Some(direction) = direction {
            ranked.retain(|r| r.stop.direction == direction);
        }

        if !(side == StopType::Train && options.group_child_stops) {
            ranked.truncate(options.limit);
        }

        ranked
    }

    /// Keep every platform of the closest `limit` stations
    ///
    /// Stations are ranked by their parent record's distance from the origin,
    /// so sibling platforms always survive or fall together. Platforms keep
    /// their own distances and ranked order in the output.
    fn group_by_station(
        &self,
        ranked_platforms: Vec<RankedStop>,
        origin: Point,
        limit: usize,
    ) -> Vec<RankedStop> {
        let snapshot = self.snapshot();

        let parent_ids: HashSet<u32> = ranked_platforms
            .iter()
            .filter_map(|r| r.stop.parent_station)
            .collect();

        // Rank candidate stations; ties break toward the lower station id
        let mut station_ranks: Vec<(f64, u32)> = parent_ids
            .into_iter()
            .map(|parent_id| {
                let dist = snapshot
                    .stop(parent_id)
                    .map(|parent| distance::distance(origin, parent.point()))
                    .unwrap_or(f64::MAX);
                (dist, parent_id)
            })
            .collect();
        station_ranks.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let keep: HashSet<u32> = station_ranks
            .into_iter()
            .take(limit)
            .map(|(_, parent_id)| parent_id)
            .collect();

        ranked_platforms
            .into_iter()
            .filter(|r| {
                r.stop
                    .parent_station
                    .map(|parent_id| keep.contains(&parent_id))
                    .unwrap_or(false)
            })
            .collect()
    }
}
