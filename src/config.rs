//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Lifetime of every cache entry in milliseconds, 0 disables expiration
    pub ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// File receiving one line per handled request
    pub log_file: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    /// Upper bound in seconds on draining connections at shutdown
    pub shutdown_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1024)
    /// - `CACHE_TTL_MS` - Entry lifetime in milliseconds (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 8888)
    /// - `LOG_FILE` - Request log path (default: server_log.log)
    /// - `REQUEST_TIMEOUT` - Request timeout in seconds (default: 10)
    /// - `SHUTDOWN_TIMEOUT` - Graceful shutdown bound in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            ttl_ms: env_or("CACHE_TTL_MS", defaults.ttl_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            log_file: env_or("LOG_FILE", defaults.log_file),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            shutdown_timeout: env_or("SHUTDOWN_TIMEOUT", defaults.shutdown_timeout),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

/// Reads and parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl_ms: 5000,
            server_port: 8888,
            log_file: PathBuf::from("server_log.log"),
            request_timeout: 10,
            shutdown_timeout: 30,
        }
    }
}
