//! Tests for the haversine distance and ranking primitives

use crate::app::models::{Direction, Point, Stop};
use crate::app::services::closest_stops::distance::{distance, rank_by_distance};

fn bus_stop(stop_id: u32, latitude: f64, longitude: f64) -> Stop {
    Stop::new(
        stop_id,
        format!("Stop {}", stop_id),
        String::new(),
        latitude,
        longitude,
        None,
        Direction::Unknown,
        false,
        None,
    )
    .unwrap()
}

#[test]
fn test_distance_to_self_is_zero() {
    let point = Point::new(41.9, -87.6);
    assert_eq!(distance(point, point), 0.0);
}

#[test]
fn test_distance_is_symmetric() {
    let a = Point::new(41.8781, -87.6298);
    let b = Point::new(41.9484, -87.6553);
    assert!((distance(a, b) - distance(b, a)).abs() < 1e-12);
}

#[test]
fn test_known_distance_chicago_to_milwaukee() {
    // Downtown Chicago to downtown Milwaukee, roughly 81 miles
    let chicago = Point::new(41.8781, -87.6298);
    let milwaukee = Point::new(43.0389, -87.9065);

    let miles = distance(chicago, milwaukee);
    assert!((79.0..85.0).contains(&miles), "got {} miles", miles);
}

#[test]
fn test_known_distance_short_range() {
    // Adjacent blocks in the Loop, well under half a mile
    let a = Point::new(41.8857, -87.6278);
    let b = Point::new(41.8827, -87.6278);

    let miles = distance(a, b);
    assert!((0.15..0.25).contains(&miles), "got {} miles", miles);
}

#[test]
fn test_ranking_sorts_ascending() {
    let origin = Point::new(41.9, -87.65);
    let near = bus_stop(1, 41.901, -87.65);
    let mid = bus_stop(2, 41.91, -87.65);
    let far = bus_stop(3, 42.0, -87.65);

    let ranked = rank_by_distance([&mid, &far, &near], origin);
    let ids: Vec<u32> = ranked.iter().map(|r| r.stop.stop_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(ranked[0].distance < ranked[1].distance);
    assert!(ranked[1].distance < ranked[2].distance);
}

#[test]
fn test_ranking_ties_keep_input_order() {
    let origin = Point::new(41.9, -87.65);
    let first = bus_stop(10, 41.91, -87.65);
    let second = bus_stop(11, 41.91, -87.65);

    let ranked = rank_by_distance([&first, &second], origin);
    let ids: Vec<u32> = ranked.iter().map(|r| r.stop.stop_id).collect();
    assert_eq!(ids, vec![10, 11]);
}

#[test]
fn test_ranking_empty_input() {
    let ranked = rank_by_distance(std::iter::empty::<&Stop>(), Point::new(41.9, -87.65));
    assert!(ranked.is_empty());
}
