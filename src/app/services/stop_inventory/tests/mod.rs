//! Tests for the stop inventory accessor

pub mod query_tests;

use crate::app::services::static_feed::FeedSnapshot;
use crate::app::services::static_feed::tests as feed_fixtures;
use std::sync::Arc;

/// Load a snapshot from the shared synthetic cache
pub async fn snapshot() -> Arc<FeedSnapshot> {
    let cache = feed_fixtures::synthetic_cache();
    let (snapshot, _) = FeedSnapshot::load_from_dir(cache.path())
        .await
        .expect("load synthetic cache");
    Arc::new(snapshot)
}
