use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A 2xx answer from GitHub, body left exactly as GitHub sent it.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Arc<Value>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Arc::new(body),
        }
    }
}

/// Error payload GitHub returns alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubErrorBody {
    pub message: String,
}
