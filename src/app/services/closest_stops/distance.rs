//! Great-circle distance and ranking

use crate::app::models::{Point, RankedStop, Stop};
use crate::constants::EARTH_RADIUS_MILES;

/// Haversine great-circle distance between two points, in miles
pub fn distance(a: Point, b: Point) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Rank stops by ascending distance from an origin
///
/// The sort is stable, so stops at identical distances keep their input
/// order; callers pass stops in ascending id order for determinism.
pub fn rank_by_distance<'a, I>(stops: I, origin: Point) -> Vec<RankedStop>
where
    I: IntoIterator<Item = &'a Stop>,
{
    let mut ranked: Vec<RankedStop> = stops
        .into_iter()
        .map(|stop| RankedStop {
            distance: distance(origin, stop.point()),
            stop: stop.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}
