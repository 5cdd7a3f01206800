// In-memory response cache.
// Entries are stamped on insert and checked lazily against the caller's TTL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::api::Payload;

/// Default TTL for cached responses: 1 minute.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: Instant,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped with the current instant.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// Cache of successful GET responses keyed by cache key.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CachedData<Payload>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a cached payload, returning None if missing or older than `ttl`.
    pub fn read_if_valid(&self, key: &str, ttl: Duration) -> Option<Payload> {
        match self.entries.get(key) {
            Some(cached) if cached.is_valid(ttl) => Some(cached.data.clone()),
            _ => None,
        }
    }

    /// Store a payload, replacing any previous entry for the key.
    pub fn write(&mut self, key: impl Into<String>, data: Payload) {
        self.entries.insert(key.into(), CachedData::new(data));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every entry whose key starts with `prefix`. Returns the number removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }
}
