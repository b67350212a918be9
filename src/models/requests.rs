//! Request DTOs for the proxy API
//!
//! Defines the query parameters accepted by the front end.

use serde::Deserialize;

/// Query string for the proxy endpoint (GET /proxy)
///
/// # Fields
/// - `url`: Target URL to fetch (falls back to the configured default)
/// - `skipCache`: Bypasses the cache when exactly `"true"`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyQuery {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "skipCache")]
    pub skip_cache: Option<String>,
}

impl ProxyQuery {
    /// Only the literal string `true` enables skip-cache.
    pub fn skip_cache(&self) -> bool {
        self.skip_cache.as_deref() == Some("true")
    }

    /// Picks the requested URL, else the default, rejecting empty strings.
    pub fn target_url<'a>(&'a self, default: Option<&'a str>) -> Option<&'a str> {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(default.filter(|url| !url.is_empty()))
    }
}
