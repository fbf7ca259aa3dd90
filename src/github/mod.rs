pub mod client;
#[cfg(test)]
pub mod mock;
pub mod types;

use async_trait::async_trait;
use client::GitHubError;
use types::UpstreamResponse;

/// Read-only access to `GET /users/<path>` on the GitHub REST API.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Full URL that `fetch(path)` requests.
    fn endpoint(&self, path: &str) -> String;

    async fn fetch(&self, path: &str) -> Result<UpstreamResponse, GitHubError>;
}
