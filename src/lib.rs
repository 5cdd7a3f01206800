//! KESNNUR admin toolkit
//!
//! A request/cache client for the admin site API (response caching,
//! in-flight deduplication, retry with backoff, fallback data), the static
//! configuration tables it reads, formatting and validation helpers, and two
//! proxy functions that attach server-held credentials before forwarding
//! upstream.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod paths;
pub mod proxy;
pub mod server;
pub mod util;

pub use api::{ApiClient, ClientConfig, Payload, RequestOptions};
pub use error::{AdminError, ApiError, Result};
