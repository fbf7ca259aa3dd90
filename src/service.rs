use crate::api_log::{ApiLogSink, NewApiCall};
use crate::cache::ResponseCache;
use crate::github::client::GitHubError;
use crate::github::types::UpstreamResponse;
use crate::github::GitHubApi;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    User,
    Followings,
}

impl Lookup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lookup::User => "user",
            Lookup::Followings => "followings",
        }
    }

    /// Path below `/users/` on the GitHub API.
    pub fn path(&self, username: &str) -> String {
        let username = urlencoding::encode(username);
        match self {
            Lookup::User => username.into_owned(),
            Lookup::Followings => format!("{}/following", username),
        }
    }

    fn check_body(&self, response: &UpstreamResponse) -> Result<(), GitHubError> {
        match (self, response.body.as_ref()) {
            (Lookup::Followings, Value::Array(_)) | (Lookup::User, _) => Ok(()),
            (Lookup::Followings, _) => Err(GitHubError::UnexpectedBody {
                status: response.status,
                expected: "a JSON array",
            }),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("{lookup} lookup for {username} failed: {source}")]
pub struct LookupError {
    pub lookup: Lookup,
    pub username: String,
    /// Status GitHub answered with, when it rejected the request.
    pub status: Option<u16>,
    #[source]
    source: Arc<GitHubError>,
}

impl LookupError {
    fn new(lookup: Lookup, username: &str, source: Arc<GitHubError>) -> Self {
        Self {
            lookup,
            username: username.to_string(),
            status: source.passthrough_status(),
            source,
        }
    }

    /// Status to answer our own caller with.
    pub fn http_status(&self) -> u16 {
        normalize_status(self.status)
    }
}

/// Anything that is not a usable HTTP status becomes 500.
pub fn normalize_status(status: Option<u16>) -> u16 {
    match status {
        Some(code) if (100..=599).contains(&code) => code,
        _ => 500,
    }
}

pub struct UserLookupService {
    github: Arc<dyn GitHubApi>,
    api_log: Arc<dyn ApiLogSink>,
    cache: ResponseCache<(Lookup, String), UpstreamResponse>,
    cache_ttl: Duration,
}

impl UserLookupService {
    pub fn new(
        github: Arc<dyn GitHubApi>,
        api_log: Arc<dyn ApiLogSink>,
        cache_ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        Self {
            github,
            api_log,
            cache: ResponseCache::new(cache_capacity),
            cache_ttl,
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<Value, LookupError> {
        let response = self.lookup(Lookup::User, username).await?;
        Ok(response.body.as_ref().clone())
    }

    pub async fn get_followings(&self, username: &str) -> Result<Vec<Value>, LookupError> {
        let response = self.lookup(Lookup::Followings, username).await?;
        match response.body.as_ref() {
            Value::Array(entries) => Ok(entries.clone()),
            _ => Err(LookupError::new(
                Lookup::Followings,
                username,
                Arc::new(GitHubError::UnexpectedBody {
                    status: response.status,
                    expected: "a JSON array",
                }),
            )),
        }
    }

    async fn lookup(&self, lookup: Lookup, username: &str) -> Result<UpstreamResponse, LookupError> {
        let path = lookup.path(username);
        let endpoint = self.github.endpoint(&path);
        let github = Arc::clone(&self.github);

        let outcome = self
            .cache
            .get_or_compute((lookup, username.to_string()), self.cache_ttl, async move {
                let response = github.fetch(&path).await?;
                lookup.check_body(&response)?;
                Ok::<_, GitHubError>(response)
            })
            .await;

        let status_code = match &outcome {
            Ok(response) => response.status,
            // 0 marks calls that never got an HTTP status back
            Err(e) => e.upstream_status().unwrap_or(0),
        };
        self.record_call(endpoint, status_code).await;

        outcome.map_err(|source| {
            tracing::warn!("GitHub {} lookup for {} failed: {}", lookup, username, source);
            LookupError::new(lookup, username, source)
        })
    }

    async fn record_call(&self, endpoint: String, status_code: u16) {
        let call = NewApiCall {
            method: "GET".to_string(),
            endpoint,
            payload: None,
            status_code: i32::from(status_code),
        };

        if let Err(e) = self.api_log.record(call).await {
            tracing::warn!("Failed to record API call: {}", e);
        }
    }
}
