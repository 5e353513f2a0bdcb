//! API Module
//!
//! HTTP handlers and routing for the cache server.
//!
//! # Endpoints
//! - `PUT|POST /cache/set` - Store a key-value pair
//! - `GET /cache/get?key=<int>` - Retrieve a value by key
//! - `GET /log` - Dump the request log
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
