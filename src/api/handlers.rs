//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::cache::{shared, Cache};
use crate::client::{FetchClient, RequestOptions, ResponseType};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::models::{HealthResponse, MessageResponse, ProxyQuery, ProxyResponse, StatsResponse};

/// Response header telling clients whether the body came from the cache.
pub const FROM_CACHE_HEADER: &str = "x-from-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Caching client; its cache is shared by every clone
    pub client: FetchClient,
    /// Target used when a request has no `url`
    pub default_target_url: Option<String>,
    pub upstream_timeout: Option<Duration>,
}

impl AppState {
    // == Constructors ==
    /// Wraps an existing client with no default target and no upstream timeout.
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            default_target_url: None,
            upstream_timeout: None,
        }
    }

    /// Builds the cache and client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = shared(Cache::new(config.cache_ttl)?);
        let client = FetchClient::new(cache, config.cache_ttl)?;

        Ok(Self {
            client,
            default_target_url: config.default_target_url.clone(),
            upstream_timeout: config.upstream_timeout,
        })
    }

    pub fn with_default_target(mut self, url: impl Into<String>) -> Self {
        self.default_target_url = Some(url.into());
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }
}

/// Fetches `target_url` as JSON on behalf of the front end.
///
/// Failures are returned as-is; mapping them to a status is the caller's job.
pub async fn handle_proxy_request(
    state: &AppState,
    target_url: &str,
    skip_cache: bool,
) -> Result<ProxyResponse> {
    let mut options = RequestOptions::new()
        .response_type(ResponseType::Json)
        .skip_cache(skip_cache);
    if let Some(timeout) = state.upstream_timeout {
        options = options.timeout(timeout);
    }

    let result = state.client.get(target_url, options).await?;

    Ok(ProxyResponse {
        data: result.data.to_json_value(),
        from_cache: result.from_cache,
        status: result.status,
    })
}

/// Handler for GET /proxy?url=...&skipCache=true
///
/// Echoes the upstream status and sets `X-From-Cache`.
pub async fn proxy_handler(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response> {
    let target = query
        .target_url(state.default_target_url.as_deref())
        .ok_or(ProxyError::MissingTargetUrl)?
        .to_string();

    let outcome = match handle_proxy_request(&state, &target, query.skip_cache()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(target_url = %target, error = %err, "upstream fetch failed");
            return Err(err);
        }
    };

    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let from_cache = HeaderValue::from_static(if outcome.from_cache { "1" } else { "0" });

    let mut response = (status, Json(outcome)).into_response();
    response.headers_mut().insert(FROM_CACHE_HEADER, from_cache);
    Ok(response)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.client.cache().read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.client.clear_cache().await;
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
