//! Test fixtures: an in-process fetcher and downloader setup

use async_trait::async_trait;
use media_dl::fetcher::{DownloadOutput, DownloadRequest, MediaFetcher, RawMediaInfo};
use media_dl::progress::ProgressEvent;
use media_dl::{Config, FetchError, MediaDownloader};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedSender;

/// Bytes written for every fake download
pub const FAKE_CONTENT: &[u8] = b"not really a video";

/// Fetcher that pretends to download by writing a small file
///
/// URLs containing `fail` fail with a yt-dlp style message.
pub struct FakeFetcher {
    /// Pause between progress events
    pub step: Duration,
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch_info(&self, url: &str) -> media_dl::Result<RawMediaInfo> {
        Ok(RawMediaInfo {
            title: Some(format!("Title of {url}")),
            duration: Some(10.0),
            uploader: Some("Fake Uploader".to_string()),
            thumbnail: None,
            description: Some("d".repeat(300)),
            view_count: Some(3),
        })
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> media_dl::Result<DownloadOutput> {
        if request.url.contains("fail") {
            return Err(FetchError::Failed {
                exit_code: Some(1),
                message: "ERROR: This video is private".to_string(),
            }
            .into());
        }

        let total = FAKE_CONTENT.len() as u64;
        for downloaded in [0, total / 2, total] {
            tokio::time::sleep(self.step).await;
            let _ = progress_tx.send(ProgressEvent::Downloading {
                downloaded_bytes: downloaded,
                total_bytes: None,
                total_bytes_estimate: Some(total),
            });
        }

        let name = if request.profile.is_audio_only() {
            "fake.mp3"
        } else {
            "fake.mp4"
        };
        let filepath = request.output_dir.join(name);
        tokio::fs::write(&filepath, FAKE_CONTENT).await?;
        let _ = progress_tx.send(ProgressEvent::Finished {
            filename: Some(filepath.display().to_string()),
        });

        Ok(DownloadOutput { filepath })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Downloader writing into a fresh temp dir (which must be kept alive)
pub async fn create_downloader() -> (Arc<MediaDownloader>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("temp dir");

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.fetcher.search_path = false;

    let fetcher = Arc::new(FakeFetcher {
        step: Duration::from_millis(5),
    });
    let downloader = MediaDownloader::with_fetcher(config, fetcher)
        .await
        .expect("downloader");
    (Arc::new(downloader), temp_dir)
}
