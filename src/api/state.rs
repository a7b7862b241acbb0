//! Application state for the API server

use crate::MediaDownloader;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The downloader that owns the task store and workers
    pub downloader: Arc<MediaDownloader>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<MediaDownloader>) -> Self {
        Self { downloader }
    }
}
