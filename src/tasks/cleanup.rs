//! TTL Prune Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task calling `prune_expired` every `interval`.
///
/// Lazy expiry on access already hides stale entries; this only reclaims
/// memory for keys nobody asks for again. Abort the returned handle on
/// shutdown.
pub fn spawn_prune_task<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting cache prune task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.prune_expired();

            if removed > 0 {
                info!("Cache prune: removed {} expired entries", removed);
            } else {
                debug!("Cache prune: no expired entries found");
            }
        }
    })
}
