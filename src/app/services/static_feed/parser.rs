//! Record parsing and normalization for the cached feed tables
//!
//! This module converts raw CSV rows into the crate's uniform model. All
//! direction normalization happens here, once at ingestion: bus directions
//! are derived from the free-text stop description, train directions from the
//! structured `direction_id` code. Queries never re-parse description text.

use crate::app::models::{
    Direction, Route, ServiceCalendar, Stop, TrainLineFlags, TrainStopInfo, Trip,
};
use crate::constants::{GTFS_DATE_FORMAT, is_bus_stop_id, is_train_platform_id};
use crate::{Error, Result};
use serde::Deserialize;

// =============================================================================
// Raw Row Shapes
// =============================================================================

/// Raw row from the GTFS `stops.txt` table
#[derive(Debug, Deserialize)]
pub struct GtfsStopRow {
    pub stop_id: u32,
    pub stop_name: String,
    #[serde(default)]
    pub stop_desc: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub parent_station: Option<u32>,
    #[serde(default)]
    pub wheelchair_boarding: Option<u8>,
}

/// Raw row from the cached train station inventory
///
/// Columns mirror the City of Chicago station feed: one row per platform
/// stop, with the parent station id in `map_id` and one boolean column per
/// service line.
#[derive(Debug, Deserialize)]
pub struct TrainStationRow {
    pub stop_id: u32,
    pub map_id: u32,
    pub stop_name: String,
    pub station_name: String,
    #[serde(default)]
    pub station_descriptive_name: String,
    pub direction_id: String,
    pub ada: String,
    pub red: String,
    pub blue: String,
    pub green: String,
    pub brown: String,
    pub purple: String,
    pub purple_exp: String,
    pub yellow: String,
    pub pink: String,
    pub orange: String,
    pub lat: f64,
    pub lon: f64,
}

/// Raw row from the cached route/stop transfer table
#[derive(Debug, Deserialize)]
pub struct TransferRow {
    pub route_id: String,
    pub stop_id: u32,
}

/// Raw row from the GTFS `routes.txt` table
#[derive(Debug, Deserialize)]
pub struct GtfsRouteRow {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
    #[serde(default)]
    pub route_color: Option<String>,
}

/// Raw row from the GTFS `trips.txt` table
#[derive(Debug, Deserialize)]
pub struct GtfsTripRow {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Raw row from the GTFS `calendar.txt` table
#[derive(Debug, Deserialize)]
pub struct GtfsCalendarRow {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

// =============================================================================
// Normalization
// =============================================================================

/// Derive a bus stop's direction from its free-text description
///
/// CTA bus descriptions embed the direction as a "...bound" word
/// (e.g. "Clark & Addison, Northbound, Northeast Corner"). Descriptions
/// without a recognizable direction yield [`Direction::Unknown`].
pub fn bus_direction_from_desc(stop_desc: &str) -> Direction {
    let lower = stop_desc.to_lowercase();
    if lower.contains("northbound") {
        Direction::North
    } else if lower.contains("southbound") {
        Direction::South
    } else if lower.contains("eastbound") {
        Direction::East
    } else if lower.contains("westbound") {
        Direction::West
    } else {
        Direction::Unknown
    }
}

/// Parse the loose boolean encodings found across CTA data exports
/// ("true"/"True"/"1" vs "false"/"False"/"0"/empty)
pub fn parse_flexible_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "t")
}

/// Convert a GTFS stop row into the uniform stop model
///
/// Bus stops get their direction from the description; train stops start out
/// with [`Direction::Unknown`] and are enriched from the station inventory by
/// the loader. Parent references are kept only for platform stops, matching
/// the id-namespace invariant.
pub fn parse_gtfs_stop(row: GtfsStopRow) -> Result<Stop> {
    let direction = if is_bus_stop_id(row.stop_id) {
        bus_direction_from_desc(&row.stop_desc)
    } else {
        Direction::Unknown
    };

    let parent_station = if is_train_platform_id(row.stop_id) {
        row.parent_station
    } else {
        None
    };

    Stop::new(
        row.stop_id,
        row.stop_name,
        row.stop_desc,
        row.stop_lat,
        row.stop_lon,
        parent_station,
        direction,
        row.wheelchair_boarding == Some(1),
        None,
    )
}

/// Extract the train attributes carried by a station inventory row
pub fn parse_train_attributes(row: &TrainStationRow) -> (Direction, TrainStopInfo) {
    let direction = row
        .direction_id
        .parse::<Direction>()
        .unwrap_or(Direction::Unknown);

    let lines = TrainLineFlags {
        red: parse_flexible_bool(&row.red),
        blue: parse_flexible_bool(&row.blue),
        green: parse_flexible_bool(&row.green),
        brown: parse_flexible_bool(&row.brown),
        purple: parse_flexible_bool(&row.purple),
        purple_express: parse_flexible_bool(&row.purple_exp),
        yellow: parse_flexible_bool(&row.yellow),
        pink: parse_flexible_bool(&row.pink),
        orange: parse_flexible_bool(&row.orange),
    };

    let info = TrainStopInfo {
        lines,
        ada: parse_flexible_bool(&row.ada),
    };

    (direction, info)
}

/// Convert a GTFS route row into the route model
pub fn parse_gtfs_route(row: GtfsRouteRow) -> Route {
    let route_name = row
        .route_long_name
        .or(row.route_short_name)
        .unwrap_or_else(|| row.route_id.clone());

    Route {
        route_id: row.route_id,
        route_name,
        route_color: row.route_color.filter(|c| !c.trim().is_empty()),
    }
}

/// Convert a GTFS trip row into the trip model
pub fn parse_gtfs_trip(row: GtfsTripRow) -> Trip {
    let direction = row
        .direction
        .as_deref()
        .and_then(|d| d.parse::<Direction>().ok())
        .unwrap_or(Direction::Unknown);

    Trip {
        trip_id: row.trip_id,
        route_id: row.route_id,
        service_id: row.service_id,
        direction,
    }
}

/// Convert a GTFS calendar row into the service calendar model
pub fn parse_gtfs_calendar(row: GtfsCalendarRow) -> Result<ServiceCalendar> {
    let start_date =
        chrono::NaiveDate::parse_from_str(&row.start_date, GTFS_DATE_FORMAT).map_err(|e| {
            Error::data_validation(format!(
                "Invalid calendar start date '{}' for service {}: {}",
                row.start_date, row.service_id, e
            ))
        })?;

    let end_date =
        chrono::NaiveDate::parse_from_str(&row.end_date, GTFS_DATE_FORMAT).map_err(|e| {
            Error::data_validation(format!(
                "Invalid calendar end date '{}' for service {}: {}",
                row.end_date, row.service_id, e
            ))
        })?;

    Ok(ServiceCalendar {
        service_id: row.service_id,
        monday: row.monday == 1,
        tuesday: row.tuesday == 1,
        wednesday: row.wednesday == 1,
        thursday: row.thursday == 1,
        friday: row.friday == 1,
        saturday: row.saturday == 1,
        sunday: row.sunday == 1,
        start_date,
        end_date,
    })
}
