//! Filter evaluation over the stop inventory

use crate::app::models::{Stop, StopType, TrainLine};
use crate::app::services::stop_inventory::{StopFilter, StopInventory, StopTypeFilter};
use tracing::debug;

/// A route filter term, pre-resolved so evaluation per stop is cheap
enum RouteTerm {
    /// A train line, matched against the stop's line flags
    Line(TrainLine),
    /// A bus route id, matched against the transfer table
    Bus(String),
}

impl<'a> StopInventory<'a> {
    /// All stops satisfying the filter, in ascending stop-id order
    ///
    /// Iteration follows the snapshot's ordered stop map, so results are
    /// deterministic across runs for the same snapshot.
    pub fn stops(&self, filter: &StopFilter) -> Vec<&'a Stop> {
        let route_terms = self.resolve_route_terms(filter);

        let results: Vec<&Stop> = self
            .snapshot()
            .stops()
            .filter(|stop| self.matches(stop, filter, route_terms.as_deref()))
            .collect();

        debug!(
            "Inventory query matched {} of {} stops",
            results.len(),
            self.snapshot().stop_count()
        );
        results
    }

    /// Get a stop by id
    pub fn get(&self, stop_id: u32) -> Option<&'a Stop> {
        self.snapshot().stop(stop_id)
    }

    /// Bus routes servicing a stop, per the transfer table
    pub fn routes_for_stop(&self, stop_id: u32) -> Vec<String> {
        self.snapshot().routes_for_stop(stop_id)
    }

    /// Pre-resolve route ids into match terms; `None` means no route filter
    fn resolve_route_terms(&self, filter: &StopFilter) -> Option<Vec<RouteTerm>> {
        if filter.route_ids.is_empty() {
            return None;
        }
        let terms = filter
            .route_ids
            .iter()
            .map(|route_id| match TrainLine::from_route_id(route_id) {
                Some(line) => RouteTerm::Line(line),
                None => RouteTerm::Bus(route_id.clone()),
            })
            .collect();
        Some(terms)
    }

    fn matches(&self, stop: &Stop, filter: &StopFilter, route_terms: Option<&[RouteTerm]>) -> bool {
        match filter.stop_type {
            StopTypeFilter::Bus if stop.stop_type() != StopType::Bus => return false,
            StopTypeFilter::Train if stop.stop_type() != StopType::Train => return false,
            _ => {}
        }

        if filter.exclude_stop_ids.contains(&stop.stop_id) {
            return false;
        }

        if let Some(direction) = filter.direction {
            // Unknown-direction stops never satisfy a direction filter
            if stop.direction != direction {
                return false;
            }
        }

        if let Some(terms) = route_terms {
            let any_match = terms.iter().any(|term| match term {
                RouteTerm::Line(line) => stop.serves_line(*line),
                RouteTerm::Bus(route_id) => self
                    .snapshot()
                    .stops_for_route(route_id)
                    .map(|stop_ids| stop_ids.contains(&stop.stop_id))
                    .unwrap_or(false),
            });
            if !any_match {
                return false;
            }
        }

        true
    }
}
