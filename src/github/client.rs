use super::types::{GitHubErrorBody, UpstreamResponse};
use super::GitHubApi;
use crate::config::Config;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("GitHub responded with HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Upstream { status: u16, message: Option<String> },
    #[error("GitHub responded with HTTP {status} but the body is not JSON: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("GitHub responded with HTTP {status} but the body is not {expected}")]
    UnexpectedBody { status: u16, expected: &'static str },
}

impl GitHubError {
    /// Status line GitHub sent, if the request got that far.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            GitHubError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            GitHubError::Upstream { status, .. }
            | GitHubError::Decode { status, .. }
            | GitHubError::UnexpectedBody { status, .. } => Some(*status),
        }
    }

    /// Status worth passing on to our own caller; only genuine upstream
    /// rejections qualify.
    pub fn passthrough_status(&self) -> Option<u16> {
        match self {
            GitHubError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .user_agent(config.github_user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.github_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.github_api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/users/{}", self.base_url, path)
    }

    async fn fetch(&self, path: &str) -> Result<UpstreamResponse, GitHubError> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<GitHubErrorBody>()
                .await
                .ok()
                .map(|body| body.message);
            tracing::warn!("GitHub rejected GET {} with HTTP {}", url, status);
            return Err(GitHubError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|source| GitHubError::Decode {
            status: status.as_u16(),
            source,
        })?;

        Ok(UpstreamResponse::new(status.as_u16(), body))
    }
}
