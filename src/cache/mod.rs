//! Cache Module
//!
//! Provides a fixed-capacity in-memory cache with LRU eviction and per-entry
//! TTL expiration.

mod entry;
mod expiry;
mod lru;
mod store;


pub use store::LruCache;

pub(crate) use entry::CacheEntry;
pub(crate) use expiry::{ExpiryQueue, TimerId};
pub(crate) use lru::{RecencyList, Slot};
pub(crate) use store::Shared;

use std::time::Duration;

// == Public Constants ==
/// Lifetime substituted for a zero TTL, long enough to never fire in practice
pub const NO_EXPIRY_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);
