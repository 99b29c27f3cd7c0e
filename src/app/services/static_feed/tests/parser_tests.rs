//! Tests for record parsing and normalization

use crate::app::models::Direction;
use crate::app::services::static_feed::parser::{
    GtfsCalendarRow, GtfsRouteRow, GtfsStopRow, TrainStationRow, bus_direction_from_desc,
    parse_flexible_bool, parse_gtfs_calendar, parse_gtfs_route, parse_gtfs_stop,
    parse_train_attributes,
};

#[test]
fn test_bus_direction_from_desc() {
    assert_eq!(
        bus_direction_from_desc("Clark & Addison, Northbound, Northeast Corner"),
        Direction::North
    );
    assert_eq!(
        bus_direction_from_desc("State & Lake, SOUTHBOUND"),
        Direction::South
    );
    assert_eq!(
        bus_direction_from_desc("Madison & Wabash, eastbound"),
        Direction::East
    );
    assert_eq!(
        bus_direction_from_desc("Washington & Wells, Westbound, Near Side"),
        Direction::West
    );
    assert_eq!(bus_direction_from_desc("No direction here"), Direction::Unknown);
    assert_eq!(bus_direction_from_desc(""), Direction::Unknown);
}

#[test]
fn test_flexible_bool_parsing() {
    for truthy in ["true", "True", "TRUE", "1", "t", " true "] {
        assert!(parse_flexible_bool(truthy), "{:?} should parse true", truthy);
    }
    for falsy in ["false", "False", "0", "", "no"] {
        assert!(!parse_flexible_bool(falsy), "{:?} should parse false", falsy);
    }
}

#[test]
fn test_parse_bus_stop_row() {
    let row = GtfsStopRow {
        stop_id: 1525,
        stop_name: "Clark & Addison".to_string(),
        stop_desc: "Clark & Addison, Northbound".to_string(),
        stop_lat: 41.947,
        stop_lon: -87.656,
        parent_station: None,
        wheelchair_boarding: Some(1),
    };

    let stop = parse_gtfs_stop(row).unwrap();
    assert_eq!(stop.direction, Direction::North);
    assert!(stop.wheelchair_boarding);
    assert!(stop.train.is_none());
}

#[test]
fn test_parse_platform_row_keeps_parent_and_defers_direction() {
    let row = GtfsStopRow {
        stop_id: 30278,
        stop_name: "Addison".to_string(),
        stop_desc: "Service toward Howard".to_string(),
        stop_lat: 41.947412,
        stop_lon: -87.653626,
        parent_station: Some(41420),
        wheelchair_boarding: Some(1),
    };

    let stop = parse_gtfs_stop(row).unwrap();
    assert_eq!(stop.parent_station, Some(41420));
    // Platform direction comes from the station inventory, not the description
    assert_eq!(stop.direction, Direction::Unknown);
}

#[test]
fn test_parse_stop_rejects_bad_coordinates() {
    let row = GtfsStopRow {
        stop_id: 100,
        stop_name: "Bad".to_string(),
        stop_desc: String::new(),
        stop_lat: 999.0,
        stop_lon: -87.6,
        parent_station: None,
        wheelchair_boarding: None,
    };
    assert!(parse_gtfs_stop(row).is_err());
}

#[test]
fn test_parse_train_attributes() {
    let row = TrainStationRow {
        stop_id: 30170,
        map_id: 40360,
        stop_name: "Southport (Kimball-bound)".to_string(),
        station_name: "Southport".to_string(),
        station_descriptive_name: "Southport (Brown Line)".to_string(),
        direction_id: "N".to_string(),
        ada: "true".to_string(),
        red: "false".to_string(),
        blue: "false".to_string(),
        green: "false".to_string(),
        brown: "true".to_string(),
        purple: "false".to_string(),
        purple_exp: "false".to_string(),
        yellow: "false".to_string(),
        pink: "false".to_string(),
        orange: "false".to_string(),
        lat: 41.943744,
        lon: -87.663619,
    };

    let (direction, info) = parse_train_attributes(&row);
    assert_eq!(direction, Direction::North);
    assert!(info.ada);
    assert!(info.lines.brown);
    assert!(!info.lines.red);
}

#[test]
fn test_parse_route_name_fallbacks() {
    let full = GtfsRouteRow {
        route_id: "22".to_string(),
        route_short_name: Some("22".to_string()),
        route_long_name: Some("Clark".to_string()),
        route_color: Some("565a5c".to_string()),
    };
    assert_eq!(parse_gtfs_route(full).route_name, "Clark");

    let short_only = GtfsRouteRow {
        route_id: "X49".to_string(),
        route_short_name: Some("X49".to_string()),
        route_long_name: None,
        route_color: Some("  ".to_string()),
    };
    let route = parse_gtfs_route(short_only);
    assert_eq!(route.route_name, "X49");
    // Blank colors are dropped
    assert!(route.route_color.is_none());

    let bare = GtfsRouteRow {
        route_id: "8A".to_string(),
        route_short_name: None,
        route_long_name: None,
        route_color: None,
    };
    assert_eq!(parse_gtfs_route(bare).route_name, "8A");
}

#[test]
fn test_parse_calendar_dates() {
    let row = GtfsCalendarRow {
        service_id: "1".to_string(),
        monday: 1,
        tuesday: 1,
        wednesday: 1,
        thursday: 1,
        friday: 1,
        saturday: 0,
        sunday: 0,
        start_date: "20260101".to_string(),
        end_date: "20261231".to_string(),
    };

    let calendar = parse_gtfs_calendar(row).unwrap();
    assert!(calendar.monday);
    assert!(!calendar.saturday);
    assert_eq!(
        calendar.start_date,
        chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    );
}

#[test]
fn test_parse_calendar_rejects_bad_date() {
    let row = GtfsCalendarRow {
        service_id: "1".to_string(),
        monday: 1,
        tuesday: 0,
        wednesday: 0,
        thursday: 0,
        friday: 0,
        saturday: 0,
        sunday: 0,
        start_date: "2026-01-01".to_string(),
        end_date: "20261231".to_string(),
    };
    assert!(parse_gtfs_calendar(row).is_err());
}
