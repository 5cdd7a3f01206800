// GitHub API endpoint functions.
// Tree listing, file read and file write against the configured repository.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

use super::client::{GitHubClient, UpstreamJson};
use super::types::{SaveFileBody, commit_message};

impl GitHubClient {
    /// Recursive tree listing of the configured branch.
    pub async fn get_tree(&self) -> Result<UpstreamJson> {
        let mut url = self.repo_url(["git", "trees", self.repo().branch.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        self.send_json(self.get(url)).await
    }

    /// Contents of one file on the configured branch.
    pub async fn get_file(&self, path: &str) -> Result<UpstreamJson> {
        let mut url = self.repo_url(std::iter::once("contents").chain(path_segments(path)))?;
        url.query_pairs_mut()
            .append_pair("ref", &self.repo().branch);
        self.send_json(self.get(url)).await
    }

    /// Create or replace a file, committing to the configured branch.
    pub async fn save_file(
        &self,
        path: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<UpstreamJson> {
        let url = self.repo_url(std::iter::once("contents").chain(path_segments(path)))?;
        let body = SaveFileBody {
            message: commit_message(path),
            content: STANDARD.encode(content.as_bytes()),
            sha: sha.map(str::to_string),
            branch: self.repo().branch.clone(),
        };
        self.send_json(self.put(url).json(&body)).await
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
