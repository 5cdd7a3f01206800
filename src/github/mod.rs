// GitHub API module.
// Client and types used by the source-hosting relay.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient, UpstreamJson};
pub use types::{RepoRef, SaveFileBody, commit_message};
