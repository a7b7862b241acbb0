//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (validation, task lookup, media fetching)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{TaskId, TaskStatus};

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// The request was missing a required field or carried an invalid value
    #[error("validation error: {0}")]
    Validation(String),

    /// The URL does not belong to any supported site
    #[error("unsupported site: {0}")]
    UnsupportedSite(String),

    /// Task not found
    #[error("task not found: {0}")]
    NotFound(String),

    /// The file was requested before the task completed
    #[error("download not complete: task {id} is {status}")]
    NotComplete {
        /// The task whose file was requested
        id: TaskId,
        /// The status the task is currently in
        status: TaskStatus,
    },

    /// The task completed but its file is gone from disk
    #[error("file not found for task {id} at {path}")]
    FileMissing {
        /// The task whose file is missing
        id: TaskId,
        /// Where the file was expected
        path: PathBuf,
    },

    /// The external media fetcher failed
    #[error("media fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors raised by a [`MediaFetcher`](crate::fetcher::MediaFetcher) implementation
#[derive(Debug, Error)]
pub enum FetchError {
    /// The yt-dlp binary could not be located
    #[error("yt-dlp binary not found: {0}")]
    BinaryNotFound(String),

    /// The external process could not be started
    #[error("failed to execute {tool}: {reason}")]
    SpawnFailed {
        /// The binary that failed to start
        tool: String,
        /// The reason reported by the OS
        reason: String,
    },

    /// The external process ran but reported failure
    #[error("{message}")]
    Failed {
        /// Process exit code, if the process exited normally
        exit_code: Option<i32>,
        /// Human-readable message, usually the last error line on stderr
        message: String,
    },

    /// The external process produced output that could not be understood
    #[error("unexpected output: {0}")]
    InvalidOutput(String),

    /// The download exceeded the configured timeout
    #[error("download timed out after {secs} seconds")]
    TimedOut {
        /// The timeout that elapsed
        secs: u64,
    },

    /// No fetcher backend is available
    #[error("no media fetcher available: {0}")]
    NotAvailable(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "task not found: 0192f1c4-...",
///     "details": {
///       "task_id": "0192f1c4-..."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,
            Error::UnsupportedSite(_) => 400,
            Error::NotComplete { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,
            Error::FileMissing { .. } => 404,

            // 500 Internal Server Error - Server-side and external tool issues
            Error::Fetch(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::UnsupportedSite(_) => "unsupported_site",
            Error::NotFound(_) => "not_found",
            Error::NotComplete { .. } => "not_complete",
            Error::FileMissing { .. } => "file_not_found",
            Error::Fetch(e) => match e {
                FetchError::BinaryNotFound(_) => "binary_not_found",
                FetchError::SpawnFailed { .. } => "spawn_failed",
                FetchError::Failed { .. } => "fetch_failed",
                FetchError::InvalidOutput(_) => "invalid_output",
                FetchError::TimedOut { .. } => "timed_out",
                FetchError::NotAvailable(_) => "fetcher_unavailable",
            },
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::NotFound(id) => Some(serde_json::json!({
                "task_id": id,
            })),
            Error::NotComplete { id, status } => Some(serde_json::json!({
                "task_id": id,
                "status": status,
            })),
            Error::FileMissing { id, .. } => Some(serde_json::json!({
                "task_id": id,
            })),
            Error::UnsupportedSite(url) => Some(serde_json::json!({
                "url": url,
            })),
            Error::Fetch(FetchError::Failed {
                exit_code: Some(code),
                ..
            }) => Some(serde_json::json!({
                "exit_code": code,
            })),
            Error::Fetch(FetchError::TimedOut { secs }) => Some(serde_json::json!({
                "timeout_seconds": secs,
            })),
            _ => None,
        };

        let mut api_error = Self::new(error.error_code(), error.to_string());
        api_error.error.details = details;
        api_error
    }
}
