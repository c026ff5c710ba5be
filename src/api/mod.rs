//! API Module
//!
//! HTTP handlers and routing exposing one cache over a REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `PUT /get-or-set` - Read a key, storing the given value on a miss
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `POST /evict` - Evict least recently used entries
//! - `GET /stats` - Get cache statistics and settings
//! - `PUT /config` - Change eviction settings at runtime
//! - `GET /memory` - Latest host memory sample
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
