//! Request and Response models for the proxy API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::ProxyQuery;
pub use responses::{HealthResponse, MessageResponse, ProxyResponse, StatsResponse};
