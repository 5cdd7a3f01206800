// GitHub API request types.
// Repository coordinates and the contents-API write body.

use serde::{Deserialize, Serialize};

/// Repository and branch the source-hosting relay works against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: branch.into(),
        }
    }
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileBody {
    pub message: String,
    /// Base64 of the UTF-8 file content.
    pub content: String,
    /// Blob SHA of the file being replaced; absent when creating a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub branch: String,
}

/// Commit message used for edits made through the admin site.
pub fn commit_message(path: &str) -> String {
    format!("Update {} via KESNNUR Admin", path)
}
