//! Cache Proxy - An HTTP forwarding proxy with a TTL response cache
//!
//! Requests are mapped to deterministic cache keys; fresh entries are served
//! from memory, misses are fetched from the origin, decoded and stored.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{handle_proxy_request, AppState};
pub use cache::{Cache, SharedCache, Ttl};
pub use client::{FetchClient, FetchResult, ParsedBody, RequestBody, RequestOptions, ResponseType};
pub use config::Config;
pub use error::{ProxyError, Result};
pub use tasks::spawn_prune_task;
