// Per-request options for the API client.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::cache::{DEFAULT_TTL, Params};

/// Default number of attempts before a request fails.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Options for a single `ApiClient::request` call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// JSON body, sent only for non-GET methods.
    pub data: Option<Value>,
    /// Query parameters, appended to the URL for GET requests.
    pub params: Params,
    pub use_cache: bool,
    pub cache_ttl: Duration,
    /// Extra headers; these win over the client's defaults.
    pub headers: Vec<(String, String)>,
    pub max_attempts: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            data: None,
            params: Params::new(),
            use_cache: false,
            cache_ttl: DEFAULT_TTL,
            headers: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(data: Value) -> Self {
        Self::with_body(Method::POST, data)
    }

    pub fn put(data: Value) -> Self {
        Self::with_body(Method::PUT, data)
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    fn with_body(method: Method, data: Value) -> Self {
        Self {
            method,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Enable response caching with the given TTL.
    pub fn cached(mut self, ttl: Duration) -> Self {
        self.use_cache = true;
        self.cache_ttl = ttl;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub(crate) fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Attempts actually made; a budget of zero still makes one.
    pub(crate) fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.data.is_none());
        assert!(options.params.is_empty());
        assert!(!options.use_cache);
        assert_eq!(options.cache_ttl, Duration::from_millis(60_000));
        assert!(options.headers.is_empty());
        assert_eq!(options.max_attempts, 3);
    }

    #[test]
    fn test_builders() {
        let options = RequestOptions::post(json!({"email": "a@b.co"}))
            .param("limit", 3)
            .bearer("tok")
            .max_attempts(0);

        assert_eq!(options.method, Method::POST);
        assert_eq!(options.params.get("limit").map(String::as_str), Some("3"));
        assert_eq!(
            options.headers,
            vec![("Authorization".to_string(), "Bearer tok".to_string())]
        );
        assert_eq!(options.attempt_budget(), 1);
        assert!(!options.is_get());
    }
}
