//! Response Body Decoding
//!
//! Turns the raw response bytes into the representation the caller asked for.

use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde_json::Value;

use crate::error::{ProxyError, Result};

// == Response Type ==
/// How the response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// JSON when the content type says so, text otherwise
    #[default]
    Auto,
    Buffer,
    Text,
    Json,
}

impl FromStr for ResponseType {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ResponseType::Auto),
            "buffer" => Ok(ResponseType::Buffer),
            "text" => Ok(ResponseType::Text),
            "json" => Ok(ResponseType::Json),
            other => Err(ProxyError::InvalidRequest(format!(
                "unknown response type: {other}"
            ))),
        }
    }
}

// == Parsed Body ==
/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Buffer(Bytes),
    Text(String),
    Json(Value),
}

impl ParsedBody {
    /// Borrows the JSON value, if the body was decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParsedBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrows the raw bytes of a `Buffer` body.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ParsedBody::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// JSON form for embedding in a response document.
    ///
    /// Buffers become base64 strings.
    pub fn to_json_value(&self) -> Value {
        match self {
            ParsedBody::Buffer(bytes) => Value::String(STANDARD.encode(bytes)),
            ParsedBody::Text(text) => Value::String(text.clone()),
            ParsedBody::Json(value) => value.clone(),
        }
    }
}

// == Decoding ==
/// Decodes `raw` according to `response_type`.
///
/// Text decoding is lossy UTF-8. An empty body parsed as JSON yields `null`.
///
/// # Arguments
/// * `raw` - Response body exactly as received
/// * `content_type` - Response `content-type`, consulted only in `Auto` mode
/// * `response_type` - Requested decoding
///
/// # Errors
/// `InvalidJsonResponse` when JSON decoding is requested (or detected) and
/// the body does not parse.
pub fn decode_body(raw: &Bytes, content_type: &str, response_type: ResponseType) -> Result<ParsedBody> {
    if response_type == ResponseType::Buffer {
        return Ok(ParsedBody::Buffer(raw.clone()));
    }

    let text = String::from_utf8_lossy(raw).into_owned();

    let parse_json = match response_type {
        ResponseType::Json => true,
        ResponseType::Auto => content_type
            .to_ascii_lowercase()
            .contains("application/json"),
        ResponseType::Text | ResponseType::Buffer => false,
    };

    if !parse_json {
        return Ok(ParsedBody::Text(text));
    }

    if text.is_empty() {
        return Ok(ParsedBody::Json(Value::Null));
    }

    serde_json::from_str(&text)
        .map(ParsedBody::Json)
        .map_err(ProxyError::InvalidJsonResponse)
}
