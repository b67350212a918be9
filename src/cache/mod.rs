//! Cache Module
//!
//! Provides an in-memory cache with per-entry TTL expiration.

mod entry;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::{CacheEntry, Expiry, Ttl};
pub use stats::CacheStats;
pub use store::{Cache, EntrySnapshot};

// == Public Constants ==
/// Default TTL in milliseconds when none is configured
pub const DEFAULT_TTL_MS: u64 = 60_000;

/// A cache shared between clients and background tasks.
///
/// Every access, reads included, takes the write lock since lookups may evict.
pub type SharedCache<V> = Arc<RwLock<Cache<V>>>;

/// Wraps a cache for sharing.
pub fn shared<V>(cache: Cache<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(cache))
}
