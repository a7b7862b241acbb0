//! Traits and types for external media fetching

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

use super::FormatProfile;
use crate::progress::ProgressEvent;

/// Metadata reported by the fetcher, before any cleanup
///
/// Every field is optional; sites differ in what they expose.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMediaInfo {
    /// Media title
    #[serde(default)]
    pub title: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Uploader or channel name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Full description
    #[serde(default)]
    pub description: Option<String>,
    /// View count
    #[serde(default)]
    pub view_count: Option<u64>,
}

/// Everything a fetcher needs to run one download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Source URL
    pub url: String,
    /// Directory the output file is written to
    pub output_dir: PathBuf,
    /// Format selection and post-processing
    pub profile: FormatProfile,
    /// Maximum title characters in the output file name
    pub title_max_len: usize,
}

/// Result of a successful download
#[must_use]
#[derive(Debug, Clone)]
pub struct DownloadOutput {
    /// Final file path, after any post-processing
    pub filepath: PathBuf,
}

/// Trait for external media fetchers
///
/// Implementations report transfer progress on `progress_tx` while
/// [`download`](MediaFetcher::download) runs. Sending is best-effort: a
/// closed channel must not abort the download.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Query metadata for `url` without downloading anything
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be executed, rejects the URL,
    /// or produces output that cannot be parsed.
    async fn fetch_info(&self, url: &str) -> crate::Result<RawMediaInfo>;

    /// Download (and optionally transcode) the media at `request.url`
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be executed, the download fails,
    /// or the final file path cannot be determined.
    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> crate::Result<DownloadOutput>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
