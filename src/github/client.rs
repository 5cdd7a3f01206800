// GitHub API HTTP client.
// Authenticates with a server-held token and returns upstream JSON untouched.

use reqwest::{
    Client, RequestBuilder, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AdminError, Result};

use super::types::RepoRef;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Upstream reply: status plus the JSON body exactly as sent.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamJson {
    pub status: StatusCode,
    pub body: Value,
}

/// GitHub API client scoped to one repository and branch.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    repo: RepoRef,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: &str, repo: RepoRef, api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| AdminError::Config(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("kesnnur-admin"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(AdminError::Http)?;

        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            repo,
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// URL under `/repos/{owner}/{repo}/` with each segment percent-encoded.
    pub(crate) fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| AdminError::Config(format!("API base cannot be a base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub(crate) fn put(&self, url: Url) -> RequestBuilder {
        self.client.put(url)
    }

    /// Send and decode the JSON body whatever the status.
    pub(crate) async fn send_json(&self, request: RequestBuilder) -> Result<UpstreamJson> {
        let response = request.send().await.map_err(AdminError::Http)?;
        let status = response.status();
        let url = response.url().to_string();
        let body: Value = response.json().await.map_err(AdminError::Http)?;

        if status.is_success() {
            debug!(%url, %status, "GitHub request completed");
        } else {
            warn!(%url, %status, "GitHub returned an error status");
        }

        Ok(UpstreamJson { status, body })
    }
}

fn parse_base(api_base: &str) -> Result<Url> {
    Url::parse(api_base).map_err(|e| AdminError::Config(format!("invalid API base '{}': {}", api_base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GitHubClient {
        GitHubClient::new("t0ken", RepoRef::new("kesnnur", "site", "main"), base).unwrap()
    }

    #[test]
    fn test_repo_url_encodes_segments() {
        let url = client(GITHUB_API_BASE)
            .repo_url(["contents", "pages", "about us.html"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/kesnnur/site/contents/pages/about%20us.html"
        );
    }

    #[test]
    fn test_repo_url_keeps_base_path() {
        let url = client("http://127.0.0.1:9000/github/")
            .repo_url(["git", "trees", "main"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/github/repos/kesnnur/site/git/trees/main"
        );
    }

    #[test]
    fn test_invalid_token_header() {
        let result = GitHubClient::new("bad\ntoken", RepoRef::new("o", "r", "main"), GITHUB_API_BASE);
        assert!(matches!(result, Err(AdminError::Config(_))));
    }
}
