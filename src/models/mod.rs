//! Request and Response models for the cache server API
//!
//! DTOs used to serialize/deserialize HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ConfigUpdateRequest, EvictRequest, SetRequest};
pub use responses::{
    DeleteResponse, EvictResponse, GetOrSetResponse, GetResponse, HealthResponse, SetResponse,
    StatsResponse,
};
