//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries. Expired
//! entries are logically absent either way; the sweep just reclaims the
//! memory they occupy between lookups.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::RuntimeCache;

/// Spawns a background task that periodically removes expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. The returned handle can be used to abort the task during
/// shutdown; the cache handle is cheaply cloned into the task.
///
/// # Example
/// ```ignore
/// let cache = RuntimeCache::new();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: RuntimeCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
