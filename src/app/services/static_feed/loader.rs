//! Snapshot assembly from the on-disk cache
//!
//! The loader reads every cached table wholesale and assembles one immutable
//! [`FeedSnapshot`]. The stops table is required; every other table is
//! optional and degrades the snapshot rather than failing the load. Malformed
//! individual records are logged, counted, and skipped.

use crate::app::models::{Direction, Stop, TrainLineFlags, TrainStopInfo};
use crate::app::services::static_feed::metadata::LoadStats;
use crate::app::services::static_feed::parser::{
    self, GtfsCalendarRow, GtfsRouteRow, GtfsStopRow, GtfsTripRow, TrainStationRow, TransferRow,
};
use crate::app::services::static_feed::{FeedSnapshot, display_path, normalize_route_id};
use crate::constants::{
    FEED_UPDATED_MARKER, GTFS_CALENDAR_FILE, GTFS_ROUTES_FILE, GTFS_STOPS_FILE, GTFS_TRIPS_FILE,
    STOP_TRANSFERS_FILE, TRAIN_STATIONS_FILE, is_train_parent_id,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

impl FeedSnapshot {
    /// Load the cached feed tables from a directory into a snapshot
    pub async fn load_from_dir(cache_dir: &Path) -> Result<(FeedSnapshot, LoadStats)> {
        let start = Instant::now();
        let mut stats = LoadStats::new();

        if !cache_dir.is_dir() {
            return Err(Error::store_unavailable(
                display_path(cache_dir),
                "Cache directory does not exist; run a feed refresh first",
            ));
        }

        info!("Loading static feed from {}", cache_dir.display());

        let mut snapshot = FeedSnapshot::empty(cache_dir.to_path_buf());

        load_stops(cache_dir, &mut snapshot, &mut stats)?;
        enrich_train_stops(cache_dir, &mut snapshot, &mut stats)?;
        synthesize_missing_parents(&mut snapshot, &mut stats)?;
        build_children_index(&mut snapshot);

        load_routes(cache_dir, &mut snapshot, &mut stats)?;
        load_trips(cache_dir, &mut snapshot, &mut stats)?;
        load_calendars(cache_dir, &mut snapshot, &mut stats)?;
        load_transfers(cache_dir, &mut snapshot, &mut stats)?;

        snapshot.published = read_publish_marker(cache_dir);

        stats.stops_loaded = snapshot.stops.len();
        stats.load_duration = start.elapsed();

        info!("{}", stats.summary());
        if stats.has_errors() {
            warn!(
                "Skipped {} malformed records during load",
                stats.records_skipped
            );
        }

        Ok((snapshot, stats))
    }
}

/// Read one CSV table, invoking the callback per successfully deserialized
/// row; deserialization failures are counted and skipped
fn read_table<R, F>(path: &Path, stats: &mut LoadStats, mut on_row: F) -> Result<()>
where
    R: DeserializeOwned,
    F: FnMut(R, &mut LoadStats),
{
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        Error::csv_parsing(
            display_path(path),
            format!("Failed to open table: {}", e),
            Some(e),
        )
    })?;

    for record in reader.deserialize::<R>() {
        stats.total_records_read += 1;
        match record {
            Ok(row) => on_row(row, stats),
            Err(e) => {
                stats.records_skipped += 1;
                stats
                    .errors
                    .push(format!("{}: {}", path.display(), e));
                debug!("Skipping malformed record in {}: {}", path.display(), e);
            }
        }
    }

    stats.tables_loaded += 1;
    Ok(())
}

/// Load the required stops table
fn load_stops(cache_dir: &Path, snapshot: &mut FeedSnapshot, stats: &mut LoadStats) -> Result<()> {
    let path = cache_dir.join(GTFS_STOPS_FILE);
    if !path.is_file() {
        return Err(Error::missing_table(cache_dir, GTFS_STOPS_FILE));
    }

    read_table::<GtfsStopRow, _>(&path, stats, |row, stats| {
        let stop_id = row.stop_id;
        match parser::parse_gtfs_stop(row) {
            Ok(stop) => {
                snapshot.stops.insert(stop.stop_id, stop);
            }
            Err(e) => {
                stats.records_skipped += 1;
                stats.errors.push(format!("stop {}: {}", stop_id, e));
                debug!("Skipping stop {}: {}", stop_id, e);
            }
        }
    })?;

    debug!("Loaded {} stops", snapshot.stops.len());
    Ok(())
}

/// Enrich train platforms with direction, line flags, and ADA status from the
/// station inventory, and union the line flags onto parent stations
fn enrich_train_stops(
    cache_dir: &Path,
    snapshot: &mut FeedSnapshot,
    stats: &mut LoadStats,
) -> Result<()> {
    let path = cache_dir.join(TRAIN_STATIONS_FILE);
    if !path.is_file() {
        warn!(
            "Train station inventory missing from cache; train stops will lack line and direction data"
        );
        return Ok(());
    }

    // parent id -> (flags union, any-ada, station name)
    let mut parents: HashMap<u32, (TrainLineFlags, bool, String)> = HashMap::new();
    let mut enriched = 0usize;

    read_table::<TrainStationRow, _>(&path, stats, |row, _| {
        let (direction, info) = parser::parse_train_attributes(&row);

        if let Some(stop) = snapshot.stops.get_mut(&row.stop_id) {
            stop.direction = direction;
            stop.train = Some(info);
            if stop.parent_station.is_none() && is_train_parent_id(row.map_id) {
                stop.parent_station = Some(row.map_id);
            }
            enriched += 1;
        }

        let entry = parents
            .entry(row.map_id)
            .or_insert_with(|| (TrainLineFlags::default(), false, row.station_name.clone()));
        entry.0 = entry.0.merge(&info.lines);
        entry.1 = entry.1 || info.ada;
    })?;

    for (parent_id, (flags, ada, _)) in &parents {
        if let Some(parent) = snapshot.stops.get_mut(parent_id) {
            let ada = *ada || parent.train.map(|t| t.ada).unwrap_or(false);
            let lines = parent
                .train
                .map(|t| t.lines.merge(flags))
                .unwrap_or(*flags);
            parent.train = Some(TrainStopInfo { lines, ada });
        }
    }

    snapshot.station_names = parents
        .into_iter()
        .map(|(parent_id, (_, _, name))| (parent_id, name))
        .collect();

    debug!("Enriched {} train platforms from station inventory", enriched);
    Ok(())
}

/// Synthesize parent-station records for platforms whose parent id has no
/// record of its own, placing the parent at the centroid of its children
fn synthesize_missing_parents(snapshot: &mut FeedSnapshot, stats: &mut LoadStats) -> Result<()> {
    // parent id -> (lat sum, lon sum, count, flags union, any-ada, any-wheelchair)
    let mut missing: HashMap<u32, (f64, f64, usize, TrainLineFlags, bool, bool)> = HashMap::new();

    for stop in snapshot.stops.values() {
        if let Some(parent_id) = stop.parent_station {
            if snapshot.stops.contains_key(&parent_id) {
                continue;
            }
            let entry = missing.entry(parent_id).or_insert((
                0.0,
                0.0,
                0,
                TrainLineFlags::default(),
                false,
                false,
            ));
            entry.0 += stop.latitude;
            entry.1 += stop.longitude;
            entry.2 += 1;
            if let Some(train) = stop.train {
                entry.3 = entry.3.merge(&train.lines);
                entry.4 = entry.4 || train.ada;
            }
            entry.5 = entry.5 || stop.wheelchair_boarding;
        }
    }

    for (parent_id, (lat_sum, lon_sum, count, flags, ada, wheelchair)) in missing {
        let name = snapshot
            .station_names
            .get(&parent_id)
            .cloned()
            .unwrap_or_else(|| format!("Station {}", parent_id));

        let parent = Stop::new(
            parent_id,
            name,
            String::new(),
            lat_sum / count as f64,
            lon_sum / count as f64,
            None,
            Direction::Unknown,
            wheelchair,
            Some(TrainStopInfo { lines: flags, ada }),
        )?;

        debug!(
            "Synthesized parent station {} from {} child platforms",
            parent_id, count
        );
        snapshot.stops.insert(parent_id, parent);
        stats.parents_synthesized += 1;
    }

    Ok(())
}

/// Build the parent -> sorted children index from platform parent references
fn build_children_index(snapshot: &mut FeedSnapshot) {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for stop in snapshot.stops.values() {
        if let Some(parent_id) = stop.parent_station {
            children.entry(parent_id).or_default().push(stop.stop_id);
        }
    }
    for ids in children.values_mut() {
        ids.sort_unstable();
    }
    snapshot.children = children;
}

fn load_routes(cache_dir: &Path, snapshot: &mut FeedSnapshot, stats: &mut LoadStats) -> Result<()> {
    let path = cache_dir.join(GTFS_ROUTES_FILE);
    if !path.is_file() {
        warn!("Routes table missing from cache; route lookups will be empty");
        return Ok(());
    }

    read_table::<GtfsRouteRow, _>(&path, stats, |row, _| {
        let route = parser::parse_gtfs_route(row);
        snapshot
            .routes
            .insert(normalize_route_id(&route.route_id), route);
    })?;

    debug!("Loaded {} routes", snapshot.routes.len());
    Ok(())
}

fn load_trips(cache_dir: &Path, snapshot: &mut FeedSnapshot, stats: &mut LoadStats) -> Result<()> {
    let path = cache_dir.join(GTFS_TRIPS_FILE);
    if !path.is_file() {
        warn!("Trips table missing from cache; trip queries will be empty");
        return Ok(());
    }

    read_table::<GtfsTripRow, _>(&path, stats, |row, _| {
        snapshot.trips.push(parser::parse_gtfs_trip(row));
    })?;

    debug!("Loaded {} trips", snapshot.trips.len());
    Ok(())
}

fn load_calendars(
    cache_dir: &Path,
    snapshot: &mut FeedSnapshot,
    stats: &mut LoadStats,
) -> Result<()> {
    let path = cache_dir.join(GTFS_CALENDAR_FILE);
    if !path.is_file() {
        warn!("Calendar table missing from cache; service-date queries will be empty");
        return Ok(());
    }

    read_table::<GtfsCalendarRow, _>(&path, stats, |row, stats| {
        let service_id = row.service_id.clone();
        match parser::parse_gtfs_calendar(row) {
            Ok(calendar) => snapshot.calendars.push(calendar),
            Err(e) => {
                stats.records_skipped += 1;
                stats.errors.push(format!("calendar {}: {}", service_id, e));
                debug!("Skipping calendar row for service {}: {}", service_id, e);
            }
        }
    })?;

    debug!("Loaded {} calendar rows", snapshot.calendars.len());
    Ok(())
}

fn load_transfers(
    cache_dir: &Path,
    snapshot: &mut FeedSnapshot,
    stats: &mut LoadStats,
) -> Result<()> {
    let path = cache_dir.join(STOP_TRANSFERS_FILE);
    if !path.is_file() {
        warn!("Stop transfer table missing from cache; bus route filters will match nothing");
        return Ok(());
    }

    read_table::<TransferRow, _>(&path, stats, |row, _| {
        snapshot
            .route_stops
            .entry(normalize_route_id(&row.route_id))
            .or_default()
            .insert(row.stop_id);
    })?;

    debug!(
        "Loaded transfer table covering {} routes",
        snapshot.route_stops.len()
    );
    Ok(())
}

/// Read the publish-timestamp marker left behind by the refresh job
fn read_publish_marker(cache_dir: &Path) -> Option<String> {
    let path = cache_dir.join(FEED_UPDATED_MARKER);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let trimmed = contents.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        }
        Err(_) => {
            debug!("No publish marker at {}", path.display());
            None
        }
    }
}
