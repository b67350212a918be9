//! Fetch Client
//!
//! Resolves a request either from the cache or from the origin, and
//! normalizes what comes back into a re-servable result.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::debug;

use crate::cache::{SharedCache, Ttl};
use crate::client::{build_cache_key, decode_body, ParsedBody, RequestOptions};
use crate::error::{ProxyError, Result};

// == Fetch Result ==
/// A normalized upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub status: u16,
    /// Response headers with lower-case names; repeated headers joined by ", "
    pub headers: HashMap<String, String>,
    pub data: ParsedBody,
    pub raw_body: Bytes,
    /// Set on the way out; cached copies always hold `false`
    pub from_cache: bool,
}

impl FetchResult {
    /// Only 2xx and 3xx responses are stored.
    pub fn is_cacheable_status(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// == Fetch Client ==
/// HTTP client with a TTL response cache in front of it.
///
/// The cache is owned by the caller and may be shared between clients.
/// Concurrent misses for the same key each reach the origin; the last
/// write wins.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    cache: SharedCache<FetchResult>,
    default_ttl: Ttl,
}

impl FetchClient {
    // == Constructor ==
    /// Creates a client in front of a caller-owned cache.
    ///
    /// # Arguments
    /// * `cache` - Shared cache the client reads from and writes to
    /// * `default_ttl` - TTL applied to every stored response
    ///
    /// Fails with `InvalidTtl` if `default_ttl` is zero.
    pub fn new(cache: SharedCache<FetchResult>, default_ttl: Ttl) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            cache,
            default_ttl: default_ttl.validate()?,
        })
    }

    /// Replaces the underlying HTTP client.
    ///
    /// Client-level settings such as default headers apply to every transfer.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the cache this client stores responses in.
    pub fn cache(&self) -> &SharedCache<FetchResult> {
        &self.cache
    }

    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    // == Get / Post ==
    /// Same as `request` with the method forced to GET.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<FetchResult> {
        self.request(url, options.method("GET")).await
    }

    /// Same as `request` with the method forced to POST.
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<FetchResult> {
        self.request(url, options.method("POST")).await
    }

    // == Request ==
    /// Serves `url` from the cache when fresh, otherwise fetches and stores it.
    ///
    /// Any status code is a valid response. Only non-skip-cache calls with a
    /// 2xx/3xx status are written to the cache.
    ///
    /// # Arguments
    /// * `url` - Target URL
    /// * `options` - Method, headers, body, cache controls and timeout
    ///
    /// # Errors
    /// - `RequestTimeout` if a non-zero timeout elapses during the transfer
    /// - `Transport` for any other network failure
    /// - `InvalidJsonResponse` if JSON decoding was required and failed
    /// - `InvalidRequest` for an unusable method, header or body
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<FetchResult> {
        let RequestOptions {
            method,
            headers,
            body,
            cache_key,
            skip_cache,
            response_type,
            timeout,
        } = options;

        let method = method.to_ascii_uppercase();
        let body = body.filter(|body| !body.is_null());
        // A zero timeout means "no timeout"
        let timeout = timeout.filter(|timeout| !timeout.is_zero());
        let key = cache_key.unwrap_or_else(|| build_cache_key(&method, url, &headers, body.as_ref()));

        if !skip_cache {
            let cached = self.cache.write().await.get(&key);
            if let Some(cached) = cached {
                debug!(%method, url, "cache hit");
                return Ok(FetchResult {
                    from_cache: true,
                    ..cached
                });
            }
            debug!(%method, url, "cache miss");
        }

        let mut outbound_headers = headers;
        let payload = body
            .map(|body| body.into_payload(&mut outbound_headers))
            .transpose()?;

        let (status, response_headers, raw_body) = self
            .transfer(&method, url, &outbound_headers, payload, timeout)
            .await?;

        let content_type = response_headers
            .get("content-type")
            .map(String::as_str)
            .unwrap_or("");
        let data = decode_body(&raw_body, content_type, response_type)?;

        let result = FetchResult {
            status,
            headers: response_headers,
            data,
            raw_body,
            from_cache: false,
        };

        if !skip_cache && result.is_cacheable_status() {
            self.cache
                .write()
                .await
                .set_with_ttl(key, result.clone(), self.default_ttl)?;
            debug!(%method, url, status, "stored response");
        } else {
            debug!(%method, url, status, skip_cache, "response not cached");
        }

        Ok(result)
    }

    // == Invalidate ==
    /// Drops one cache entry by key. No-op if absent.
    ///
    /// # Arguments
    /// * `key` - Derived or caller-supplied cache key
    pub async fn invalidate(&self, key: &str) {
        self.cache.write().await.delete(key);
    }

    // == Clear Cache ==
    /// Drops every cached response.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    // == Transfer ==
    /// Sends the request and buffers the whole body.
    ///
    /// The response is consumed before returning, so the connection is
    /// released on every path.
    async fn transfer(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        payload: Option<Bytes>,
        timeout: Option<Duration>,
    ) -> Result<(u16, HashMap<String, String>, Bytes)> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ProxyError::InvalidRequest(format!("invalid method: {method}")))?;

        let mut builder = self
            .http
            .request(method, url)
            .headers(outbound_header_map(headers)?);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let raw_body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        Ok((status, headers, raw_body))
    }
}

fn outbound_header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ProxyError::InvalidRequest(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ProxyError::InvalidRequest(format!("invalid value for header {name}")))?;
        map.append(name, value);
    }
    Ok(map)
}

fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match flat.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    flat
}

/// Timeouts only count as `RequestTimeout` when the caller configured one.
fn classify_transport_error(err: reqwest::Error, timeout: Option<Duration>) -> ProxyError {
    match timeout {
        Some(timeout) if err.is_timeout() => ProxyError::RequestTimeout(timeout_millis(timeout)),
        _ => ProxyError::Transport(err),
    }
}

/// Whole milliseconds, rounded up so a sub-millisecond timeout never reads as 0.
fn timeout_millis(timeout: Duration) -> u64 {
    let mut millis = timeout.as_millis();
    if timeout.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}
