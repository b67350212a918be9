//! Fetch Client Module
//!
//! Cache key derivation, the outbound transfer and response decoding.

mod body;
mod fetch;
mod key;
mod options;

pub use body::{decode_body, ParsedBody, ResponseType};
pub use fetch::{FetchClient, FetchResult};
pub use key::{build_cache_key, normalize_headers};
pub use options::{RequestBody, RequestOptions};
