//! Housekeeping Task
//!
//! Background task that periodically evicts expired entries and stale failures
//! from the artwork cache, then drops card sessions that no longer apply.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::resolver::CardImageResolver;

/// Spawns a background task that periodically runs
/// [`ArtworkCache::cleanup`](crate::engine::ArtworkCache::cleanup) followed by
/// [`CardImageResolver::prune`].
///
/// The first run happens after one full interval; start-up loading already
/// drops expired entries.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    resolver: Arc<CardImageResolver>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache housekeeping task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = resolver.cache().cleanup().await;
            let pruned = resolver.prune().await;
            if removed > 0 || pruned > 0 {
                info!(
                    "Housekeeping: removed {} cache entries and {} card sessions",
                    removed, pruned
                );
            } else {
                debug!("Housekeeping: nothing to remove");
            }
        }
    })
}
