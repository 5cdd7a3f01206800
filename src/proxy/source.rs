// Source-hosting relay.
// POST {action, path?, content?, sha?} is validated into a SourceAction and run against GitHub
// with the server-held token.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HeaderName};
use hyper::{Method, Response, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::github::{GitHubClient, RepoRef, UpstreamJson};

use super::{error_body, respond};

const CORS_HEADERS: [(HeaderName, &str); 2] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
];

const JSON_HEADERS: [(HeaderName, &str); 3] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (CONTENT_TYPE, "application/json"),
];

/// Request body as sent by the admin site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

/// Validated relay operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAction {
    GetFiles,
    GetFile {
        path: String,
    },
    SaveFile {
        path: String,
        content: String,
        sha: Option<String>,
    },
}

impl SourceAction {
    pub fn name(&self) -> &'static str {
        match self {
            SourceAction::GetFiles => "getFiles",
            SourceAction::GetFile { .. } => "getFile",
            SourceAction::SaveFile { .. } => "saveFile",
        }
    }
}

impl TryFrom<SourceRequest> for SourceAction {
    type Error = AdminError;

    fn try_from(request: SourceRequest) -> Result<Self> {
        let action = request.action.unwrap_or_default();
        match action.as_str() {
            "getFiles" => Ok(SourceAction::GetFiles),
            "getFile" => Ok(SourceAction::GetFile {
                path: required(request.path, "getFile", "path")?,
            }),
            "saveFile" => Ok(SourceAction::SaveFile {
                path: required(request.path, "saveFile", "path")?,
                content: request.content.ok_or(AdminError::MissingField {
                    action: "saveFile",
                    field: "content",
                })?,
                sha: request.sha.filter(|sha| !sha.is_empty()),
            }),
            _ => Err(AdminError::InvalidAction(action)),
        }
    }
}

fn required(value: Option<String>, action: &'static str, field: &'static str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(AdminError::MissingField { action, field })
}

/// Reads and writes repository files with a server-held token.
#[derive(Debug, Clone)]
pub struct SourceRelay {
    github: Option<GitHubClient>,
}

impl SourceRelay {
    /// Relay for `repo`. Without a token every call answers "not configured".
    pub fn new(token: Option<&str>, repo: RepoRef, api_base: &str) -> Result<Self> {
        let github = match token.filter(|t| !t.is_empty()) {
            Some(token) => Some(GitHubClient::new(token, repo, api_base)?),
            None => {
                warn!("GitHub token not configured; source relay requests will fail");
                None
            }
        };
        Ok(Self { github })
    }

    pub fn is_configured(&self) -> bool {
        self.github.is_some()
    }

    /// Handle one relay invocation.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Response<Full<Bytes>> {
        if *method == Method::OPTIONS {
            return respond(StatusCode::OK, &CORS_HEADERS, "ok");
        }

        match self.dispatch(body).await {
            Ok(upstream) => respond(StatusCode::OK, &JSON_HEADERS, upstream.body.to_string()),
            Err(e) => {
                warn!(error = %e, "Source relay request failed");
                respond(StatusCode::BAD_REQUEST, &JSON_HEADERS, error_body(&e.to_string()))
            }
        }
    }

    async fn dispatch(&self, body: &[u8]) -> Result<UpstreamJson> {
        let request: SourceRequest = serde_json::from_slice(body)?;
        let github = self.github.as_ref().ok_or(AdminError::MissingToken)?;
        let action = SourceAction::try_from(request)?;

        info!(action = action.name(), "Source relay request");

        match action {
            SourceAction::GetFiles => github.get_tree().await,
            SourceAction::GetFile { path } => github.get_file(&path).await,
            SourceAction::SaveFile { path, content, sha } => {
                github.save_file(&path, &content, sha.as_deref()).await
            }
        }
    }
}
