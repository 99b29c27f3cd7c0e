//! Snapshot metadata and load statistics tracking

use std::path::PathBuf;
use std::time::Instant;

/// Statistics about a snapshot load
#[derive(Debug, Clone)]
pub struct LoadStats {
    /// Number of feed tables read
    pub tables_loaded: usize,

    /// Total number of records read across all tables
    pub total_records_read: usize,

    /// Number of stops loaded after normalization
    pub stops_loaded: usize,

    /// Number of records skipped as malformed
    pub records_skipped: usize,

    /// Number of parent stations synthesized from child-platform centroids
    /// because the feed carried no parent record
    pub parents_synthesized: usize,

    /// Time taken to load the snapshot
    pub load_duration: std::time::Duration,

    /// Any errors encountered while loading individual records
    pub errors: Vec<String>,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self {
            tables_loaded: 0,
            total_records_read: 0,
            stops_loaded: 0,
            records_skipped: 0,
            parents_synthesized: 0,
            load_duration: std::time::Duration::ZERO,
            errors: Vec::new(),
        }
    }

    /// Check if any record-level errors occurred during loading
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fraction of read records that were skipped, as a percentage
    pub fn skip_rate(&self) -> f64 {
        if self.total_records_read == 0 {
            0.0
        } else {
            (self.records_skipped as f64 / self.total_records_read as f64) * 100.0
        }
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Loaded {} tables, {} stops from {} records ({:.1}% skipped) in {:.2}s",
            self.tables_loaded,
            self.stops_loaded,
            self.total_records_read,
            self.skip_rate(),
            self.load_duration.as_secs_f64()
        )
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about a loaded feed snapshot
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    /// Directory the snapshot was loaded from
    pub cache_dir: PathBuf,

    /// Upstream publish timestamp recorded by the refresh job, if known
    pub published: Option<String>,

    /// Number of stops in the snapshot
    pub stop_count: usize,

    /// Number of routes in the snapshot
    pub route_count: usize,

    /// Number of trips in the snapshot
    pub trip_count: usize,

    /// Number of service calendar rows in the snapshot
    pub calendar_count: usize,

    /// When the snapshot was loaded
    pub loaded_at: Instant,
}

impl SnapshotMetadata {
    /// Age of the snapshot since loading
    pub fn age(&self) -> std::time::Duration {
        self.loaded_at.elapsed()
    }

    /// Get a summary string of the snapshot
    pub fn summary(&self) -> String {
        format!(
            "Snapshot with {} stops, {} routes, {} trips (published: {}, age: {:.1}s)",
            self.stop_count,
            self.route_count,
            self.trip_count,
            self.published.as_deref().unwrap_or("unknown"),
            self.age().as_secs_f64()
        )
    }
}
