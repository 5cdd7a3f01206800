// Cache module for in-memory response caching.
// Holds successful GET responses for the lifetime of a client.

pub mod key;
pub mod store;

pub use key::{Params, cache_key};
pub use store::{CachedData, DEFAULT_TTL, ResponseCache};
