// Cache key construction.
// Keys combine the endpoint with a JSON rendering of its parameters in sorted key order.

use std::collections::BTreeMap;

/// Query parameters, kept sorted by name so equal sets render identically.
pub type Params = BTreeMap<String, String>;

/// Build the cache key for an endpoint and its parameters.
///
/// The key has the form `{endpoint}:{json}`, so every key for an endpoint
/// starts with the endpoint itself and can be invalidated by prefix.
pub fn cache_key(endpoint: &str, params: &Params) -> String {
    // BTreeMap<String, String> always serializes; the fallback only guards the signature.
    let rendered = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
    format!("{}:{}", endpoint, rendered)
}
