//! Feed refresh job
//!
//! Downloads the upstream CTA data sources and rewrites the local cache
//! wholesale: the GTFS bundle, the route/stop transfer table, and the train
//! station inventory. A publish-timestamp marker recorded alongside the
//! tables lets subsequent runs skip the download when the upstream bundle has
//! not changed.

use crate::app::services::static_feed::display_path;
use crate::config::Config;
use crate::constants::{
    FEED_UPDATED_MARKER, GTFS_CALENDAR_FILE, GTFS_FEED_URL, GTFS_ROUTES_FILE, GTFS_STOPS_FILE,
    GTFS_TRIPS_FILE, SCHEDULE_DATA_BASE, STOP_TRANSFERS_FILE, STOP_TRANSFERS_URL,
    TRAIN_STATIONS_FILE, TRAIN_STATIONS_URL,
};
use crate::{Error, Result};
use serde::Deserialize;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// GTFS tables extracted from the downloaded bundle
const GTFS_TABLES: [&str; 4] = [
    GTFS_STOPS_FILE,
    GTFS_ROUTES_FILE,
    GTFS_TRIPS_FILE,
    GTFS_CALENDAR_FILE,
];

/// Outcome of a refresh run
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The cached feed already matches the upstream publish timestamp
    UpToDate { published: Option<String> },

    /// The cache was rewritten from upstream
    Refreshed {
        published: Option<String>,
        tables_written: usize,
    },
}

/// Downloads upstream feed data into the local cache
#[derive(Debug, Clone)]
pub struct FeedRefresher {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl FeedRefresher {
    /// Create a refresher targeting the configured cache directory
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.geocoder.timeout_secs.max(30)))
            .build()
            .map_err(|e| Error::feed_download("Failed to build HTTP client", Some(e)))?;

        Ok(Self {
            client,
            cache_dir: config.cache_dir.clone(),
        })
    }

    /// Refresh the cache from upstream
    ///
    /// Skips the download when the upstream publish timestamp matches the
    /// cached marker, unless `force` is set. A partially failed refresh
    /// leaves whatever tables were written; the next load degrades per table.
    pub async fn refresh(&self, force: bool) -> Result<RefreshOutcome> {
        let published = self.fetch_publish_timestamp().await;
        let cached = self.cached_timestamp();

        if !is_stale(published.as_deref(), cached.as_deref(), force) {
            info!(
                "Cached feed is current (published {})",
                cached.as_deref().unwrap_or("unknown")
            );
            return Ok(RefreshOutcome::UpToDate { published });
        }

        std::fs::create_dir_all(&self.cache_dir).map_err(|e| {
            Error::store_unavailable(
                display_path(&self.cache_dir),
                format!("Failed to create cache directory: {}", e),
            )
        })?;

        let mut tables_written = 0usize;
        tables_written += self.download_gtfs_bundle().await?;
        tables_written += self.download_transfers().await?;
        tables_written += self.download_train_stations().await?;

        self.write_marker(published.as_deref())?;

        info!(
            "Feed refresh complete: {} tables written to {}",
            tables_written,
            self.cache_dir.display()
        );
        Ok(RefreshOutcome::Refreshed {
            published,
            tables_written,
        })
    }

    /// Scrape the upstream publish timestamp from the schedule data page
    async fn fetch_publish_timestamp(&self) -> Option<String> {
        let response = match self.client.get(SCHEDULE_DATA_BASE).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to reach schedule data page: {}", e);
                return None;
            }
        };

        let html = match response.error_for_status().map(|r| r.text()) {
            Ok(text) => match text.await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to read schedule data page: {}", e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Schedule data page returned an error: {}", e);
                return None;
            }
        };

        let published = parse_publish_timestamp(&html);
        if published.is_none() {
            warn!("Could not find a publish timestamp on the schedule data page");
        }
        published
    }

    /// Publish timestamp recorded by the previous refresh, if any
    fn cached_timestamp(&self) -> Option<String> {
        let contents = std::fs::read_to_string(self.cache_dir.join(FEED_UPDATED_MARKER)).ok()?;
        let trimmed = contents.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    /// Download the GTFS bundle and extract the tables the loader reads
    async fn download_gtfs_bundle(&self) -> Result<usize> {
        info!("Downloading GTFS bundle from {}", GTFS_FEED_URL);

        let bytes = self
            .client
            .get(GTFS_FEED_URL)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::feed_download("Failed to download GTFS bundle", Some(e)))?
            .bytes()
            .await
            .map_err(|e| Error::feed_download("Failed to read GTFS bundle body", Some(e)))?;

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            Error::feed_download(format!("GTFS bundle is not a valid archive: {}", e), None)
        })?;

        let mut written = 0usize;
        for table in GTFS_TABLES {
            let mut entry = match archive.by_name(table) {
                Ok(entry) => entry,
                Err(_) if table == GTFS_STOPS_FILE => {
                    return Err(Error::feed_download(
                        format!("GTFS bundle is missing the required '{}' table", table),
                        None,
                    ));
                }
                Err(_) => {
                    warn!("GTFS bundle is missing optional table '{}'", table);
                    continue;
                }
            };

            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents).map_err(|e| {
                Error::feed_download(format!("Failed to extract '{}': {}", table, e), None)
            })?;

            write_cache_file(&self.cache_dir.join(table), &contents)?;
            debug!("Extracted {} ({} bytes)", table, contents.len());
            written += 1;
        }

        Ok(written)
    }

    /// Download the route/stop transfer table and cache it in normalized form
    async fn download_transfers(&self) -> Result<usize> {
        info!("Downloading stop transfer table from {}", STOP_TRANSFERS_URL);

        let body = self
            .client
            .get(STOP_TRANSFERS_URL)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::feed_download("Failed to download transfer table", Some(e)))?
            .text()
            .await
            .map_err(|e| Error::feed_download("Failed to read transfer table body", Some(e)))?;

        let path = self.cache_dir.join(STOP_TRANSFERS_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;

        writer
            .write_record(["route_id", "stop_id"])
            .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;

        let mut rows = 0usize;
        let mut skipped = 0usize;
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split(',');
            let route_id = fields.next().unwrap_or_default().trim();
            let stop_id = fields.next().unwrap_or_default().trim();
            if route_id.is_empty() || stop_id.parse::<u32>().is_err() {
                skipped += 1;
                continue;
            }
            writer
                .write_record([route_id, stop_id])
                .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;
            rows += 1;
        }

        writer
            .flush()
            .map_err(|e| Error::io("Failed to flush transfer table", e))?;

        if skipped > 0 {
            debug!("Skipped {} malformed transfer rows", skipped);
        }
        debug!("Cached {} transfer rows", rows);
        Ok(1)
    }

    /// Download the train station inventory and cache it as a flat table
    async fn download_train_stations(&self) -> Result<usize> {
        info!("Downloading train station inventory from {}", TRAIN_STATIONS_URL);

        let records: Vec<StationRecord> = self
            .client
            .get(TRAIN_STATIONS_URL)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::feed_download("Failed to download station inventory", Some(e)))?
            .json()
            .await
            .map_err(|e| Error::feed_download("Failed to parse station inventory", Some(e)))?;

        let path = self.cache_dir.join(TRAIN_STATIONS_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;

        writer
            .write_record([
                "stop_id",
                "map_id",
                "stop_name",
                "station_name",
                "station_descriptive_name",
                "direction_id",
                "ada",
                "red",
                "blue",
                "green",
                "brown",
                "purple",
                "purple_exp",
                "yellow",
                "pink",
                "orange",
                "lat",
                "lon",
            ])
            .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;

        let mut rows = 0usize;
        for record in &records {
            writer
                .write_record([
                    record.stop_id.as_str(),
                    record.map_id.as_str(),
                    record.stop_name.as_str(),
                    record.station_name.as_str(),
                    record.station_descriptive_name.as_str(),
                    record.direction_id.as_str(),
                    bool_str(record.ada),
                    bool_str(record.red),
                    bool_str(record.blue),
                    bool_str(record.g),
                    bool_str(record.brn),
                    bool_str(record.p),
                    bool_str(record.pexp),
                    bool_str(record.y),
                    bool_str(record.pnk),
                    bool_str(record.o),
                    record.location.latitude.as_str(),
                    record.location.longitude.as_str(),
                ])
                .map_err(|e| Error::csv_parsing(display_path(&path), e.to_string(), Some(e)))?;
            rows += 1;
        }

        writer
            .flush()
            .map_err(|e| Error::io("Failed to flush station inventory", e))?;

        debug!("Cached {} station rows", rows);
        Ok(1)
    }

    /// Record the upstream publish timestamp alongside the cached tables
    fn write_marker(&self, published: Option<&str>) -> Result<()> {
        let Some(published) = published else {
            warn!("No upstream publish timestamp; leaving marker unwritten");
            return Ok(());
        };
        write_cache_file(
            &self.cache_dir.join(FEED_UPDATED_MARKER),
            published.as_bytes(),
        )
    }
}

/// One station platform record from the City of Chicago data portal
#[derive(Debug, Deserialize)]
struct StationRecord {
    stop_id: String,
    map_id: String,
    stop_name: String,
    station_name: String,
    #[serde(default)]
    station_descriptive_name: String,
    #[serde(default)]
    direction_id: String,
    #[serde(default)]
    ada: bool,
    #[serde(default)]
    red: bool,
    #[serde(default)]
    blue: bool,
    #[serde(default)]
    g: bool,
    #[serde(default)]
    brn: bool,
    #[serde(default)]
    p: bool,
    #[serde(default)]
    pexp: bool,
    #[serde(default)]
    y: bool,
    #[serde(default)]
    pnk: bool,
    #[serde(default)]
    o: bool,
    location: StationLocation,
}

#[derive(Debug, Deserialize)]
struct StationLocation {
    latitude: String,
    longitude: String,
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn write_cache_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents)
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))
}

/// Decide whether the cache needs a re-download
///
/// The cache is stale unless both timestamps are known and equal; an unknown
/// upstream or missing marker always re-downloads, and `force` overrides a
/// current cache.
pub(crate) fn is_stale(upstream: Option<&str>, cached: Option<&str>, force: bool) -> bool {
    if force {
        return true;
    }
    match (upstream, cached) {
        (Some(upstream), Some(cached)) => upstream != cached,
        _ => true,
    }
}

/// Extract the GTFS bundle's publish timestamp from the schedule data page
///
/// The page lists the bundle with a timestamp like "8/26/2026 10:15:32 AM"
/// immediately before the download link. Returns `None` when the page layout
/// does not match.
pub(crate) fn parse_publish_timestamp(html: &str) -> Option<String> {
    let link_pos = html.find("google_transit.zip")?;
    let before = &html[..link_pos];

    let meridiem = before.rfind("AM").max(before.rfind("PM"))?;
    let tail = &before[..meridiem];

    let start = tail
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '/' | ':' | ' '))
        .last()
        .map(|(i, _)| i)?;

    let timestamp = format!("{} {}", tail[start..].trim(), &before[meridiem..meridiem + 2]);
    if timestamp.chars().any(|c| c.is_ascii_digit()) {
        Some(timestamp)
    } else {
        None
    }
}
