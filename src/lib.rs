//! LRU Cache Server - A thread-safe LRU cache with per-entry TTL expiration
//!
//! The [`cache`] module holds the engine; the remaining modules expose it as a
//! small HTTP service.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod request_log;
mod tasks;

pub use api::{create_router, AppState};
pub use cache::LruCache;
pub use config::Config;
pub use request_log::RequestLog;
