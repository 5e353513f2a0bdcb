//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

/// Request body for the SET operation (PUT/POST /cache/set)
///
/// Missing fields fall back to `0` and `""`. Capitalised field names are
/// accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRequest {
    /// The cache key
    #[serde(default, alias = "Key", alias = "KEY")]
    pub key: i64,
    /// The value to store
    #[serde(default, alias = "Value", alias = "VALUE")]
    pub value: String,
}

impl SetRequest {
    /// Decodes the first JSON document in `body`.
    ///
    /// Anything after that document is ignored. An empty body is an error.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        let mut de = serde_json::Deserializer::from_slice(body);
        Self::deserialize(&mut de)
    }
}

/// Query string of the GET operation (GET /cache/get?key=...)
///
/// The key is taken as text so a malformed key can be reported as
/// `Invalid key` rather than a generic query rejection.
#[derive(Debug, Clone, Default)]
pub struct GetQuery {
    pub key: Option<String>,
}

impl GetQuery {
    /// Builds the query from decoded pairs, keeping the first `key`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let key = pairs
            .into_iter()
            .find_map(|(name, value)| (name == "key").then_some(value));
        Self { key }
    }

    /// Parses the key as a signed integer.
    ///
    /// Returns None when the parameter is absent or not an integer.
    pub fn parse_key(&self) -> Option<i64> {
        self.key.as_deref()?.parse().ok()
    }
}
