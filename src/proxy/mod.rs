//! Proxy functions
//!
//! Two stateless handlers that attach a server-held credential before
//! forwarding upstream: a generic CORS relay for the backend and a relay for
//! reading and writing repository files on the source-hosting API.

pub mod relay;
pub mod source;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};

pub use relay::CorsRelay;
pub use source::{SourceAction, SourceRelay, SourceRequest};

/// Build a response from static header values.
pub(crate) fn respond(
    status: StatusCode,
    headers: &[(HeaderName, &'static str)],
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    for (name, value) in headers {
        response
            .headers_mut()
            .insert(name.clone(), HeaderValue::from_static(*value));
    }
    response
}

/// `{"error": "<message>"}`
pub(crate) fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
