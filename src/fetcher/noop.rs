//! No-op media fetcher for graceful degradation

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::traits::{DownloadOutput, DownloadRequest, MediaFetcher, RawMediaInfo};
use crate::error::FetchError;
use crate::progress::ProgressEvent;

/// No-op fetcher used when yt-dlp is unavailable
///
/// The server still starts and answers status requests; every lookup and
/// download fails with [`FetchError::NotAvailable`], which workers record as
/// the task's error state.
///
/// # Examples
///
/// ```
/// use media_dl::fetcher::{MediaFetcher, NoOpMediaFetcher};
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = NoOpMediaFetcher;
/// assert!(fetcher.fetch_info("https://youtu.be/x").await.is_err());
/// # }
/// ```
pub struct NoOpMediaFetcher;

const UNAVAILABLE: &str = "media downloads require the yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaFetcher for NoOpMediaFetcher {
    async fn fetch_info(&self, _url: &str) -> crate::Result<RawMediaInfo> {
        Err(FetchError::NotAvailable(UNAVAILABLE.to_string()).into())
    }

    async fn download(
        &self,
        _request: &DownloadRequest,
        _progress_tx: UnboundedSender<ProgressEvent>,
    ) -> crate::Result<DownloadOutput> {
        Err(FetchError::NotAvailable(UNAVAILABLE.to_string()).into())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
