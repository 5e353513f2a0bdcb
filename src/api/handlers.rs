//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::io;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    response::IntoResponse,
    Json,
};
use tracing::debug;

use crate::cache::LruCache;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{GetQuery, GetResponse, HealthResponse, SetRequest};
use crate::request_log::RequestLog;

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so handlers share it without an
/// outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Integer-keyed string cache
    pub cache: LruCache<i64, String>,
    /// Access log backing `GET /log`
    pub request_log: Arc<RequestLog>,
}

impl AppState {
    /// Creates a new AppState from a cache and an opened request log.
    pub fn new(cache: LruCache<i64, String>, request_log: RequestLog) -> Self {
        Self {
            cache,
            request_log: Arc::new(request_log),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the request log file cannot be opened.
    pub async fn from_config(config: &Config) -> io::Result<Self> {
        let cache = LruCache::new(config.capacity, config.ttl());
        let request_log = RequestLog::open(&config.log_file).await?;
        Ok(Self::new(cache, request_log))
    }
}

/// Handler for PUT/POST /cache/set
///
/// The body is decoded as JSON whatever its content type. Only the first
/// document counts.
pub async fn set_handler(State(state): State<AppState>, body: Bytes) -> Result<String> {
    let req = SetRequest::from_body(&body).map_err(ApiError::InvalidBody)?;
    let key = req.key;

    state.cache.put(key, req.value);
    debug!(key, "value set");

    Ok(format!("Value set in cache for key {}\n", key))
}

/// Handler for GET /cache/get?key=<int>
///
/// A hit marks the key as most recently used. When `key` is repeated the
/// first occurrence wins.
pub async fn get_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<GetResponse>> {
    let key = GetQuery::from_pairs(pairs)
        .parse_key().ok_or(ApiError::InvalidKey)?;
    let value = state.cache.get(&key).ok_or(ApiError::NotFound(key))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /log
pub async fn log_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let contents = state.request_log.read_all().await?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        contents,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
