// Generic CORS relay.
// GET ?url=<target> is fetched with the backend API key and the JSON body returned with open CORS headers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderName,
};
use hyper::{Method, Response, StatusCode};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AdminError, Result};

use super::{error_body, respond};

const RELAY_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (CONTENT_TYPE, "application/json"),
];

#[derive(Debug, Deserialize)]
struct RelayQuery {
    url: Option<String>,
}

/// Forwards GETs to arbitrary backend URLs with the anonymous API key attached.
#[derive(Debug, Clone)]
pub struct CorsRelay {
    client: Client,
    api_key: String,
}

impl CorsRelay {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build().map_err(AdminError::Http)?;
        Ok(Self::with_client(client, api_key))
    }

    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Handle one relay invocation.
    pub async fn handle(&self, method: &Method, query: Option<&str>) -> Response<Full<Bytes>> {
        if *method != Method::GET {
            return respond(StatusCode::METHOD_NOT_ALLOWED, &[], "Method Not Allowed");
        }

        let Some(target) = target_url(query) else {
            return respond(StatusCode::BAD_REQUEST, &[], "URL parameter is required");
        };

        match self.forward(&target).await {
            Ok(body) => {
                debug!(%target, "Relayed request");
                respond(StatusCode::OK, &RELAY_HEADERS, body.to_string())
            }
            Err(e) => {
                warn!(%target, error = %e, "Relay request failed");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &[(CONTENT_TYPE, "application/json")],
                    error_body(&e.to_string()),
                )
            }
        }
    }

    async fn forward(&self, target: &str) -> Result<Value> {
        let response = self
            .client
            .get(target)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Ok(response.json().await?)
    }
}

/// Non-empty `url` parameter from a raw query string.
fn target_url(query: Option<&str>) -> Option<String> {
    let parsed: RelayQuery = serde_urlencoded::from_str(query?).ok()?;
    parsed.url.filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url() {
        assert_eq!(
            target_url(Some("url=https%3A%2F%2Fdb.example.org%2Frest%2Fv1%2Fevents%3Fselect%3D*")),
            Some("https://db.example.org/rest/v1/events?select=*".to_string())
        );
        assert_eq!(target_url(Some("other=1")), None);
        assert_eq!(target_url(Some("url=")), None);
        assert_eq!(target_url(None), None);
    }

    #[tokio::test]
    async fn test_rejects_non_get() {
        let relay = CorsRelay::new("key").unwrap();
        let response = relay.handle(&Method::POST, Some("url=http://x")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_requires_url() {
        let relay = CorsRelay::new("key").unwrap();
        let response = relay.handle(&Method::GET, Some("foo=bar")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
