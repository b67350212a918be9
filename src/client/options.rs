//! Request Options
//!
//! Per-call options for the fetch client and the request body model.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde_json::Value;

use crate::client::body::ResponseType;
use crate::error::{ProxyError, Result};

// == Request Body ==
/// Outbound request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as-is
    Binary(Bytes),
    /// Serialized to JSON, defaults the content type to `application/json`
    Structured(Value),
    /// Sent as text, defaults the content type to `text/plain`
    Scalar(String),
}

impl RequestBody {
    // == Constructors ==
    /// Builds a scalar body from anything with a string form.
    ///
    /// # Arguments
    /// * `value` - Sent as its `to_string()` form with `text/plain`
    pub fn scalar(value: impl ToString) -> Self {
        RequestBody::Scalar(value.to_string())
    }

    /// True for `Structured(Value::Null)`, which the client treats as no body.
    pub fn is_null(&self) -> bool {
        matches!(self, RequestBody::Structured(Value::Null))
    }

    /// Serialized form used as cache key material.
    ///
    /// Binary bodies are base64 encoded; structured bodies use canonical
    /// JSON (object keys sorted).
    pub fn key_material(&self) -> String {
        match self {
            RequestBody::Binary(bytes) => STANDARD.encode(bytes),
            RequestBody::Structured(value) => value.to_string(),
            RequestBody::Scalar(text) => text.clone(),
        }
    }

    // == Payload ==
    /// Converts the body into wire bytes.
    ///
    /// Adds a default content type to `headers` unless the caller already
    /// supplied one under any letter case.
    ///
    /// # Arguments
    /// * `headers` - Outbound headers, in the order they will be sent
    pub fn into_payload(self, headers: &mut Vec<(String, String)>) -> Result<Bytes> {
        match self {
            RequestBody::Binary(bytes) => Ok(bytes),
            RequestBody::Structured(value) => {
                let encoded = serde_json::to_vec(&value)
                    .map_err(|e| ProxyError::InvalidRequest(format!("unserializable body: {e}")))?;
                ensure_header(headers, "content-type", "application/json");
                Ok(Bytes::from(encoded))
            }
            RequestBody::Scalar(text) => {
                ensure_header(headers, "content-type", "text/plain");
                Ok(Bytes::from(text))
            }
        }
    }
}

/// Objects and arrays are structured; strings, numbers and booleans are
/// scalars. `null` stays structured and is dropped by the client, so the
/// request is sent without a body.
impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RequestBody::Scalar(text),
            Value::Number(number) => RequestBody::Scalar(number.to_string()),
            Value::Bool(flag) => RequestBody::Scalar(flag.to_string()),
            value @ (Value::Null | Value::Array(_) | Value::Object(_)) => {
                RequestBody::Structured(value)
            }
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Binary(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Binary(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Scalar(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Scalar(text.to_string())
    }
}

/// Case-insensitive header presence check.
fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}

fn ensure_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if !has_header(headers, name) {
        headers.push((name.to_string(), value.to_string()));
    }
}

// == Request Options ==
/// Options for a single `FetchClient::request` call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method, case-insensitive
    pub method: String,
    /// Headers in the order and case they will be sent
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Overrides the derived cache key
    pub cache_key: Option<String>,
    /// Neither read from nor write to the cache
    pub skip_cache: bool,
    pub response_type: ResponseType,
    /// Applies to the whole transfer, body included
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
            cache_key: None,
            skip_cache: false,
            response_type: ResponseType::Auto,
            timeout: None,
        }
    }
}

impl RequestOptions {
    // == Builder ==
    /// Same as `default()`: GET, no headers, no body, cache enabled, auto decoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method; upper-cased before sending.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Appends a header. Name case and order only matter on the wire.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body; see `RequestBody` for how it is sent.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Uses `key` instead of the derived cache key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = skip;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Timeout for the whole transfer. Zero disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
