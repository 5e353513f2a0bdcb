//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{get_handler, health_handler, log_handler, set_handler, AppState};
use crate::request_log::log_requests;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT|POST /cache/set` - Store a key-value pair
/// - `GET /cache/get?key=<int>` - Retrieve a value by key
/// - `GET /log` - Dump the request log
/// - `GET /health` - Health check endpoint
///
/// # Middleware (outermost first)
/// - Tracing: Logs all requests for debugging
/// - CORS: Allows any origin; `OPTIONS` is answered here with an empty 200
/// - Timeout: Aborts requests running longer than `request_timeout`
/// - Request log: Appends one line per request to the log file
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let request_log = Arc::clone(&state.request_log);

    // Build router with all endpoints
    Router::new()
        .route("/cache/set", put(set_handler).post(set_handler))
        .route("/cache/get", get(get_handler))
        .route("/log", get(log_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(request_log, log_requests))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
