//! API Module
//!
//! HTTP front end for the caching proxy.
//!
//! # Endpoints
//! - `GET /proxy?url=...&skipCache=true` - Fetch a target through the cache
//! - `GET /stats` - Cache statistics
//! - `DELETE /cache` - Drop every cached response
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
