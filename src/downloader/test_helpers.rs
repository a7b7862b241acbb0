//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::error::FetchError;
use crate::fetcher::{DownloadOutput, DownloadRequest, MediaFetcher, RawMediaInfo};
use crate::progress::ProgressEvent;
use crate::types::{TaskId, TaskSnapshot};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::mpsc::UnboundedSender;

/// How a scripted download ends
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    /// Write a file with this name into the output directory and report it
    WriteFile(String),
    /// Report a path that was never written
    ReportMissing(String),
    /// Fail with this message
    Fail(String),
    /// Panic inside the fetcher
    Panic,
    /// Never finish
    Hang,
}

/// Fetcher that replays a fixed script instead of running yt-dlp
pub(crate) struct ScriptedFetcher {
    pub events: Vec<ProgressEvent>,
    pub step_delay: Duration,
    pub outcome: Outcome,
    pub info: Option<RawMediaInfo>,
    pub requests: Mutex<Vec<DownloadRequest>>,
    pub info_calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            events: Vec::new(),
            step_delay: Duration::ZERO,
            outcome,
            info: None,
            requests: Mutex::new(Vec::new()),
            info_calls: AtomicUsize::new(0),
        }
    }

    /// Downloads that write `name` after a typical progress sequence
    pub fn completing(name: &str) -> Self {
        let mut fetcher = Self::new(Outcome::WriteFile(name.to_string()));
        fetcher.events = vec![
            ProgressEvent::Downloading {
                downloaded_bytes: 0,
                total_bytes: Some(1000),
                total_bytes_estimate: None,
            },
            ProgressEvent::Downloading {
                downloaded_bytes: 500,
                total_bytes: Some(1000),
                total_bytes_estimate: None,
            },
            ProgressEvent::Downloading {
                downloaded_bytes: 1000,
                total_bytes: Some(1000),
                total_bytes_estimate: None,
            },
            ProgressEvent::Finished {
                filename: Some(name.to_string()),
            },
        ];
        fetcher
    }

    pub fn with_info(mut self, info: RawMediaInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn recorded_requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn fetch_info(&self, _url: &str) -> crate::Result<RawMediaInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.info.clone().ok_or_else(|| {
            FetchError::Failed {
                exit_code: Some(1),
                message: "ERROR: Unsupported URL".to_string(),
            }
            .into()
        })
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> crate::Result<DownloadOutput> {
        self.requests.lock().unwrap().push(request.clone());

        for event in &self.events {
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            let _ = progress_tx.send(event.clone());
        }

        match &self.outcome {
            Outcome::WriteFile(name) => {
                let filepath = request.output_dir.join(name);
                tokio::fs::write(&filepath, b"media bytes").await?;
                Ok(DownloadOutput { filepath })
            }
            Outcome::ReportMissing(name) => Ok(DownloadOutput {
                filepath: request.output_dir.join(name),
            }),
            Outcome::Fail(message) => Err(FetchError::Failed {
                exit_code: Some(1),
                message: message.clone(),
            }
            .into()),
            Outcome::Panic => panic!("scripted fetcher panic"),
            Outcome::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Config rooted in a fresh temp dir (which must be kept alive)
pub(crate) fn test_config() -> (Config, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.max_concurrent_downloads = 2;
    config.fetcher.search_path = false;

    (config, temp_dir)
}

/// Helper to create a test MediaDownloader with a fetcher that completes.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (MediaDownloader, tempfile::TempDir) {
    create_test_downloader_with(Arc::new(ScriptedFetcher::completing("clip.mp4"))).await
}

/// Helper to create a test MediaDownloader around a given fetcher
pub(crate) async fn create_test_downloader_with(
    fetcher: Arc<dyn MediaFetcher>,
) -> (MediaDownloader, tempfile::TempDir) {
    let (config, temp_dir) = test_config();
    let downloader = MediaDownloader::with_fetcher(config, fetcher).await.unwrap();
    (downloader, temp_dir)
}

/// Poll until the task reaches a terminal state, collecting every snapshot seen
pub(crate) async fn wait_for_terminal(
    downloader: &MediaDownloader,
    id: &TaskId,
) -> Vec<TaskSnapshot> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snapshot = downloader.status(id).unwrap();
        let done = snapshot.status.is_terminal();
        seen.push(snapshot);
        if done {
            return seen;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {id} did not finish in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
