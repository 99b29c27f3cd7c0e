//! Data models for CTA transit data
//!
//! This module contains the core data structures representing stops, routes,
//! trips, and service calendars in a uniform shape regardless of whether a
//! record originated from the bus or train side of the system.

use crate::constants::{is_bus_stop_id, is_train_parent_id, is_train_platform_id};
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Geographic Point
// =============================================================================

/// An immutable WGS84 coordinate pair, the unit of all distance computations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Point {
    /// Create a new point
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// =============================================================================
// Directions and Stop Taxonomy
// =============================================================================

/// Normalized direction of travel served by a stop
///
/// Bus stops carry their direction as free text embedded in the stop
/// description ("...Northbound"); train platforms carry a structured
/// single-letter code. Both are normalized to this enum once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    /// Direction could not be derived from the source record
    Unknown,
}

impl Direction {
    /// Single-letter code used by the train feed ("N", "S", "E", "W")
    pub fn code(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
            Direction::Unknown => "-",
        }
    }

    /// Long-form label used by the bus feed ("Northbound" etc.)
    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "Northbound",
            Direction::South => "Southbound",
            Direction::East => "Eastbound",
            Direction::West => "Westbound",
            Direction::Unknown => "-",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    /// Parse a direction from any of the forms found in CTA data:
    /// "N", "n", "north", "Northbound", etc.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let direction = match lower.as_str() {
            s if s.starts_with('n') => Direction::North,
            s if s.starts_with('s') => Direction::South,
            s if s.starts_with('e') => Direction::East,
            s if s.starts_with('w') => Direction::West,
            "-" | "" => Direction::Unknown,
            _ => {
                return Err(Error::data_validation(format!(
                    "Unrecognized direction: '{}'",
                    s
                )));
            }
        };
        Ok(direction)
    }
}

/// Stop classification derived from the stop id namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopType {
    Bus,
    Train,
}

// =============================================================================
// Train Lines
// =============================================================================

/// The nine CTA train service lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainLine {
    Red,
    Blue,
    Green,
    Brown,
    Purple,
    PurpleExpress,
    Yellow,
    Pink,
    Orange,
}

impl TrainLine {
    /// All lines, in feed column order
    pub const ALL: [TrainLine; 9] = [
        TrainLine::Red,
        TrainLine::Blue,
        TrainLine::Green,
        TrainLine::Brown,
        TrainLine::Purple,
        TrainLine::PurpleExpress,
        TrainLine::Yellow,
        TrainLine::Pink,
        TrainLine::Orange,
    ];

    /// Route identifier as used in route filters ("red", "purple_exp", ...)
    pub fn route_id(&self) -> &'static str {
        match self {
            TrainLine::Red => "red",
            TrainLine::Blue => "blue",
            TrainLine::Green => "green",
            TrainLine::Brown => "brown",
            TrainLine::Purple => "purple",
            TrainLine::PurpleExpress => "purple_exp",
            TrainLine::Yellow => "yellow",
            TrainLine::Pink => "pink",
            TrainLine::Orange => "orange",
        }
    }

    /// Look up a line by its route identifier (case-insensitive)
    pub fn from_route_id(route_id: &str) -> Option<Self> {
        let lower = route_id.trim().to_lowercase();
        TrainLine::ALL
            .iter()
            .copied()
            .find(|line| line.route_id() == lower)
    }
}

/// Per-line boolean membership flags for a train stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainLineFlags {
    pub red: bool,
    pub blue: bool,
    pub green: bool,
    pub brown: bool,
    pub purple: bool,
    pub purple_express: bool,
    pub yellow: bool,
    pub pink: bool,
    pub orange: bool,
}

impl TrainLineFlags {
    /// Check whether this stop serves the given line
    pub fn serves(&self, line: TrainLine) -> bool {
        match line {
            TrainLine::Red => self.red,
            TrainLine::Blue => self.blue,
            TrainLine::Green => self.green,
            TrainLine::Brown => self.brown,
            TrainLine::Purple => self.purple,
            TrainLine::PurpleExpress => self.purple_express,
            TrainLine::Yellow => self.yellow,
            TrainLine::Pink => self.pink,
            TrainLine::Orange => self.orange,
        }
    }

    /// Set the membership flag for a line
    pub fn set(&mut self, line: TrainLine, value: bool) {
        match line {
            TrainLine::Red => self.red = value,
            TrainLine::Blue => self.blue = value,
            TrainLine::Green => self.green = value,
            TrainLine::Brown => self.brown = value,
            TrainLine::Purple => self.purple = value,
            TrainLine::PurpleExpress => self.purple_express = value,
            TrainLine::Yellow => self.yellow = value,
            TrainLine::Pink => self.pink = value,
            TrainLine::Orange => self.orange = value,
        }
    }

    /// Union of two flag sets
    pub fn merge(&self, other: &TrainLineFlags) -> TrainLineFlags {
        let mut merged = *self;
        for line in TrainLine::ALL {
            if other.serves(line) {
                merged.set(line, true);
            }
        }
        merged
    }

    /// Lines served by this stop
    pub fn lines(&self) -> Vec<TrainLine> {
        TrainLine::ALL
            .iter()
            .copied()
            .filter(|line| self.serves(*line))
            .collect()
    }
}

/// Train-specific attributes attached to platform and parent-station stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainStopInfo {
    /// Line membership flags
    pub lines: TrainLineFlags,

    /// ADA accessibility flag
    pub ada: bool,
}

// =============================================================================
// Stop
// =============================================================================

/// A single boardable location, bus or train
///
/// The stop type is always derived from the id namespace and never stored,
/// so it cannot desync from the id:
/// - `0..30000` bus stops
/// - `30000..40000` train platform stops (children)
/// - `40000..50000` train parent stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Globally unique stop identifier
    pub stop_id: u32,

    /// Human-readable stop name
    pub stop_name: String,

    /// Free-text description; for bus stops this embeds the direction
    pub stop_desc: String,

    /// Latitude in WGS84 decimal degrees
    pub latitude: f64,

    /// Longitude in WGS84 decimal degrees
    pub longitude: f64,

    /// Parent station reference; set only for train platform stops
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_station: Option<u32>,

    /// Direction of travel, normalized at ingestion
    pub direction: Direction,

    /// Wheelchair boarding flag from the GTFS feed
    pub wheelchair_boarding: bool,

    /// Train-specific attributes; `None` for bus stops
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train: Option<TrainStopInfo>,
}

impl Stop {
    /// Create a new stop with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stop_id: u32,
        stop_name: String,
        stop_desc: String,
        latitude: f64,
        longitude: f64,
        parent_station: Option<u32>,
        direction: Direction,
        wheelchair_boarding: bool,
        train: Option<TrainStopInfo>,
    ) -> Result<Self> {
        let stop = Self {
            stop_id,
            stop_name,
            stop_desc,
            latitude,
            longitude,
            parent_station,
            direction,
            wheelchair_boarding,
            train,
        };

        stop.validate()?;
        Ok(stop)
    }

    /// Validate stop data against the id-namespace invariants
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::data_validation(format!(
                "Invalid latitude {} for stop {}: must be between -90 and 90 degrees",
                self.latitude, self.stop_id
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::data_validation(format!(
                "Invalid longitude {} for stop {}: must be between -180 and 180 degrees",
                self.longitude, self.stop_id
            )));
        }

        if is_train_platform_id(self.stop_id) {
            // Every platform belongs to exactly one parent station
            match self.parent_station {
                Some(parent) if is_train_parent_id(parent) => {}
                Some(parent) => {
                    return Err(Error::data_validation(format!(
                        "Platform stop {} has parent {} outside the parent-station id range",
                        self.stop_id, parent
                    )));
                }
                None => {
                    return Err(Error::data_validation(format!(
                        "Platform stop {} is missing a parent station",
                        self.stop_id
                    )));
                }
            }
        } else if self.parent_station.is_some() {
            return Err(Error::data_validation(format!(
                "Stop {} is not a train platform and cannot have a parent station",
                self.stop_id
            )));
        }

        if is_bus_stop_id(self.stop_id) && self.train.is_some() {
            return Err(Error::data_validation(format!(
                "Bus stop {} cannot carry train attributes",
                self.stop_id
            )));
        }

        Ok(())
    }

    /// Stop type derived from the id namespace
    pub fn stop_type(&self) -> StopType {
        if is_bus_stop_id(self.stop_id) {
            StopType::Bus
        } else {
            StopType::Train
        }
    }

    /// True for stops in the train parent-station id range
    pub fn is_parent_station(&self) -> bool {
        is_train_parent_id(self.stop_id)
    }

    /// True for stops in the train platform (child) id range
    pub fn is_train_platform(&self) -> bool {
        is_train_platform_id(self.stop_id)
    }

    /// Stop location as a point
    pub fn point(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }

    /// Check whether this stop serves a train line
    pub fn serves_line(&self, line: TrainLine) -> bool {
        self.train.map(|t| t.lines.serves(line)).unwrap_or(false)
    }
}

// =============================================================================
// Routes, Trips, and Calendars
// =============================================================================

/// A bus or train route as listed in the GTFS routes table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Alphanumeric route identifier ("22", "X49", "Red", ...)
    pub route_id: String,

    /// Full route name
    pub route_name: String,

    /// Route color hex code, when published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_color: Option<String>,
}

/// A scheduled trip from the GTFS trips table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub direction: Direction,
}

/// A service calendar row: which weekdays a service id runs, and over which
/// date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCalendar {
    pub service_id: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ServiceCalendar {
    /// Check whether this service runs on the given date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date || date > self.end_date {
            return false;
        }
        match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

// =============================================================================
// Ranked Results
// =============================================================================

/// A stop paired with its great-circle distance from a query origin, in miles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStop {
    pub stop: Stop,

    /// Distance from the query origin in miles
    pub distance: f64,
}

impl RankedStop {
    /// Direction code for train stops ("N", "S", "E", "W"); `None` for bus
    /// stops, whose direction is exposed through `stop.direction` directly
    pub fn direction_code(&self) -> Option<&'static str> {
        match self.stop.stop_type() {
            StopType::Train => Some(self.stop.direction.code()),
            StopType::Bus => None,
        }
    }
}
