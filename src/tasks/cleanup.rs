//! Expired Entry Purge Task
//!
//! Background task that periodically removes dead cache entries. Reads already
//! treat dead entries as absent; this only reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that calls [`CacheStore::cleanup_expired`] every `interval`.
///
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_cleanup_task<V>(cache: Arc<CacheStore<V>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting cache purge task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "Cache purge: removed expired entries");
            } else {
                debug!("Cache purge: no expired entries found");
            }
        }
    })
}
