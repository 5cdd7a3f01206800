// Admin site API module.
// Provides the request/cache client, its transport seam and the API types.

pub mod client;
pub mod endpoints;
pub mod fallback;
pub mod options;
pub mod payload;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ClientConfig, DEFAULT_BACKOFF_BASE};
pub use fallback::{FallbackEndpoint, FallbackPayload, FallbackTable};
pub use options::{DEFAULT_MAX_ATTEMPTS, RequestOptions};
pub use payload::Payload;
pub use transport::{HttpTransport, OutboundRequest, Transport, TransportResponse};
pub use types::*;
