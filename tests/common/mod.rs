//! Shared test helpers: a counting mock origin server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Origin server counting every request it receives.
pub struct MockOrigin {
    pub base_url: String,
    count: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl MockOrigin {
    pub async fn start() -> Self {
        let count = Arc::new(AtomicU64::new(0));

        let app = Router::new()
            .route("/data", get(data))
            .route("/delay", get(delay))
            .route("/text", get(text))
            .route("/bad-json", get(bad_json))
            .route("/status/:code", get(status))
            .route("/echo", post(echo))
            .with_state(count.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            count,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request_count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Drop for MockOrigin {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type Counter = Arc<AtomicU64>;

fn next_id(count: &Counter) -> u64 {
    count.fetch_add(1, Ordering::SeqCst) + 1
}

async fn data(State(count): State<Counter>) -> Json<Value> {
    let request_id = next_id(&count);
    Json(json!({
        "message": "Hello from mock server",
        "requestId": request_id,
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn delay(
    State(count): State<Counter>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let request_id = next_id(&count);
    let delay_ms: u64 = params
        .get("delay")
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Json(json!({ "status": "delayed", "delay": delay_ms, "requestId": request_id }))
}

async fn text(State(count): State<Counter>) -> impl IntoResponse {
    next_id(&count);
    ([(header::CONTENT_TYPE, "text/plain")], "plain text body")
}

async fn bad_json(State(count): State<Counter>) -> impl IntoResponse {
    next_id(&count);
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn status(State(count): State<Counter>, Path(code): Path<u16>) -> impl IntoResponse {
    let request_id = next_id(&count);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "status": code, "requestId": request_id })))
}

/// Echoes what the origin received.
async fn echo(State(count): State<Counter>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let request_id = next_id(&count);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let custom = headers
        .get("x-custom")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({
        "requestId": request_id,
        "contentType": content_type,
        "custom": custom,
        "body": String::from_utf8_lossy(&body),
        "length": body.len(),
    }))
}

/// Percent-encodes a query component.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/data")
}
