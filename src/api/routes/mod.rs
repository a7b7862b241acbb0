//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`info`] — Metadata lookup
//! - [`tasks`] — Download submission, status polling and file retrieval
//! - [`system`] — Health, events, OpenAPI

use serde::{Deserialize, Serialize};

use crate::types::TaskId;

mod info;
mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` works
pub use info::*;
pub use system::*;
pub use tasks::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/info
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoRequest {
    /// Media page URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Request body for POST /api/download
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadRequestBody {
    /// Media page URL
    #[serde(default)]
    pub url: Option<String>,
    /// One of "audio", "480p", "720p", "1080p" (anything else means 1080p)
    #[serde(default)]
    pub quality: Option<String>,
}

/// Response for POST /api/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Opaque id to poll with
    pub task_id: TaskId,
    /// Always "started"
    pub status: String,
}

/// Pull a non-empty URL out of an optional request field
pub(crate) fn required_url(url: Option<String>) -> crate::Result<String> {
    match url.map(|u| u.trim().to_string()) {
        Some(u) if !u.is_empty() => Ok(u),
        _ => Err(crate::Error::Validation("URL required".to_string())),
    }
}

/// Map a JSON extractor rejection to a validation error
pub(crate) fn bad_body(rejection: axum::extract::rejection::JsonRejection) -> crate::Error {
    crate::Error::Validation(rejection.body_text())
}
