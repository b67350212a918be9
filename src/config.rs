//! Configuration Module
//!
//! Handles loading proxy configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{Ttl, DEFAULT_TTL_MS};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// TTL for cached upstream responses
    pub cache_ttl: Ttl,
    /// Target used when a proxy request carries no `url`
    pub default_target_url: Option<String>,
    /// Timeout applied to proxied fetches, `None` = wait indefinitely
    pub upstream_timeout: Option<Duration>,
    /// Interval between prune sweeps, `None` = no sweeper
    pub prune_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HOST` - Bind address (default: 127.0.0.1)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL_MS` - Cache TTL in ms, or `inf` (default: 60000)
    /// - `API_URL` - Default proxy target (default: none)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream timeout in ms, 0 disables (default: none)
    /// - `PRUNE_INTERVAL_MS` - Prune sweep interval in ms, 0 disables (default: 30000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            cache_ttl: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| parse_ttl(&v))
                .unwrap_or(defaults.cache_ttl),
            default_target_url: env::var("API_URL").ok().filter(|v| !v.is_empty()),
            upstream_timeout: env::var("UPSTREAM_TIMEOUT_MS")
                .ok()
                .and_then(|v| parse_optional_millis(&v))
                .unwrap_or(defaults.upstream_timeout),
            prune_interval: env::var("PRUNE_INTERVAL_MS")
                .ok()
                .and_then(|v| parse_optional_millis(&v))
                .unwrap_or(defaults.prune_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cache_ttl: Ttl::from_millis(DEFAULT_TTL_MS),
            default_target_url: None,
            upstream_timeout: None,
            prune_interval: Some(Duration::from_millis(30_000)),
        }
    }
}

/// Parses a TTL; zero and garbage are rejected so the default applies.
fn parse_ttl(value: &str) -> Option<Ttl> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("inf") || value.eq_ignore_ascii_case("infinite") {
        return Some(Ttl::Infinite);
    }
    match value.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Ttl::from_millis(ms)),
    }
}

/// `Some(None)` for an explicit 0, `None` when unparsable.
fn parse_optional_millis(value: &str) -> Option<Option<Duration>> {
    match value.trim().parse::<u64>() {
        Ok(0) => Some(None),
        Ok(ms) => Some(Some(Duration::from_millis(ms))),
        Err(_) => None,
    }
}
