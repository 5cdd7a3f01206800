// Error types for the admin client and proxies.
// ApiError is the request channel shared by deduplicated callers, AdminError covers everything else.

use thiserror::Error;

/// Failure of a single client request after retries are exhausted.
///
/// Cloneable so one in-flight result can be handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status code when the server answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub token not configured")]
    MissingToken,

    #[error("Invalid action")]
    InvalidAction(String),

    #[error("Missing '{field}' for {action}")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdminError>;
