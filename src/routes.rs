use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    config::Config,
    service::{LookupError, UserLookupService},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<UserLookupService>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed lookup, ready to be sent back as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn from_lookup(err: &LookupError, message: &str) -> Self {
        Self {
            status: StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// Route handlers
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.service.get_user(&username).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => {
            tracing::error!("Failed to get user: {}", e);
            Err(ApiError::from_lookup(&e, &state.config.messages.user))
        }
    }
}

pub async fn get_followings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    match state.service.get_followings(&username).await {
        Ok(followings) => Ok(Json(followings)),
        Err(e) => {
            tracing::error!("Failed to get followings: {}", e);
            Err(ApiError::from_lookup(&e, &state.config.messages.followings))
        }
    }
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/:username", get(get_user))
        .route("/:username/followings", get(get_followings))
        .with_state(state)
}

/// Mounts `router` below `prefix`; an empty prefix or `/` keeps it at the root.
pub fn mount(prefix: &str, router: Router) -> Router {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return router;
    }

    let prefix = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{}", prefix)
    };
    Router::new().nest(&prefix, router)
}
