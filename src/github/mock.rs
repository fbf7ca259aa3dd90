use super::client::GitHubError;
use super::types::UpstreamResponse;
use super::GitHubApi;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
enum Scripted {
    Reply(u16, Value),
    Unreachable,
}

/// Scripted stand-in for GitHub that counts how often it is asked.
pub struct MockGitHubClient {
    replies: HashMap<String, Scripted>,
    calls: AtomicUsize,
    calls_by_path: Mutex<HashMap<String, usize>>,
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: AtomicUsize::new(0),
            calls_by_path: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_reply(mut self, path: &str, status: u16, body: Value) -> Self {
        self.replies.insert(path.to_string(), Scripted::Reply(status, body));
        self
    }

    pub fn with_unreachable(mut self, path: &str) -> Self {
        self.replies.insert(path.to_string(), Scripted::Unreachable);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, path: &str) -> usize {
        self.calls_by_path
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

fn transport_error() -> reqwest::Error {
    // An unparsable URL is the cheapest way to get a real reqwest::Error.
    reqwest::Client::new().get("not a url").build().unwrap_err()
}

#[async_trait]
impl GitHubApi for MockGitHubClient {
    fn endpoint(&self, path: &str) -> String {
        format!("https://api.github.com/users/{}", path)
    }

    async fn fetch(&self, path: &str) -> Result<UpstreamResponse, GitHubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_path
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;

        let scripted = self
            .replies
            .get(path)
            .cloned()
            .unwrap_or_else(|| Scripted::Reply(404, serde_json::json!({ "message": "Not Found" })));

        match scripted {
            Scripted::Reply(status, body) if (200..300).contains(&status) => {
                Ok(UpstreamResponse::new(status, body))
            }
            Scripted::Reply(status, body) => Err(GitHubError::Upstream {
                status,
                message: body.get("message").and_then(Value::as_str).map(str::to_string),
            }),
            Scripted::Unreachable => Err(GitHubError::RequestFailed(transport_error())),
        }
    }
}
