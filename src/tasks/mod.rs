//! Background Tasks Module
//!
//! Contains the work that runs independently of request handling.
//!
//! # Tasks
//! - Expiry worker: removes cache entries whose TTL timer has fired

mod expiry;

pub(crate) use expiry::spawn_expiry_worker;
