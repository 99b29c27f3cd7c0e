//! Tests for filter evaluation

use crate::app::models::Direction;
use crate::app::services::stop_inventory::tests::snapshot;
use crate::app::services::stop_inventory::{StopFilter, StopInventory, StopTypeFilter};

#[tokio::test]
async fn test_unfiltered_query_returns_all_stops_ordered() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let stops = inventory.stops(&StopFilter::any());
    assert_eq!(stops.len(), snapshot.stop_count());

    // Ascending stop-id order
    let ids: Vec<u32> = stops.iter().map(|s| s.stop_id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn test_stop_type_filter() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let buses = inventory.stops(&StopFilter::any().with_stop_type(StopTypeFilter::Bus));
    assert_eq!(buses.len(), 3);
    assert!(buses.iter().all(|s| s.stop_id < 30_000));

    let trains = inventory.stops(&StopFilter::any().with_stop_type(StopTypeFilter::Train));
    assert_eq!(trains.len(), 6);
    assert!(trains.iter().all(|s| s.stop_id >= 30_000));
}

#[tokio::test]
async fn test_bus_route_filter_uses_transfer_table() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any().with_routes(["22".to_string()]);
    let stops = inventory.stops(&filter);
    let ids: Vec<u32> = stops.iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![1525, 1526]);

    // Route ids are matched case-insensitively
    let filter = StopFilter::any().with_routes(["x49".to_string()]);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![18033]);
}

#[tokio::test]
async fn test_train_route_filter_uses_line_flags() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any().with_routes(["red".to_string()]);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    // Both Addison platforms plus the parent station carrying the union flags
    assert_eq!(ids, vec![30277, 30278, 41420]);

    let filter = StopFilter::any().with_routes(["brown".to_string()]);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![30170, 30171, 40360]);
}

#[tokio::test]
async fn test_route_filter_matches_any_requested_route() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any().with_routes(["22".to_string(), "red".to_string()]);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![1525, 1526, 30277, 30278, 41420]);
}

#[tokio::test]
async fn test_unknown_route_matches_nothing() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any().with_routes(["999".to_string()]);
    assert!(inventory.stops(&filter).is_empty());
}

#[tokio::test]
async fn test_direction_filter_excludes_unknown() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any().with_direction(Direction::North);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    // Northbound bus stop and northbound platforms; parent stations carry an
    // unknown direction and never match
    assert_eq!(ids, vec![1525, 30170, 30278]);
    assert!(!ids.contains(&41420));
}

#[tokio::test]
async fn test_exclusion_filter() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any()
        .with_stop_type(StopTypeFilter::Bus)
        .with_excluded([1525]);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![1526, 18033]);
}

#[tokio::test]
async fn test_conjunctive_filters() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    let filter = StopFilter::any()
        .with_stop_type(StopTypeFilter::Train)
        .with_routes(["red".to_string()])
        .with_direction(Direction::South);
    let ids: Vec<u32> = inventory.stops(&filter).iter().map(|s| s.stop_id).collect();
    assert_eq!(ids, vec![30277]);
}

#[tokio::test]
async fn test_lookup_helpers() {
    let snapshot = snapshot().await;
    let inventory = StopInventory::new(&snapshot);

    assert_eq!(inventory.get(1525).unwrap().stop_name, "Clark & Addison");
    assert!(inventory.get(123_456).is_none());
    assert_eq!(inventory.routes_for_stop(1525), vec!["22".to_string()]);
}
