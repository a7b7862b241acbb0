//! Task orchestration split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`worker`] - Submission and the per-task download worker
//! - [`info`] - Synchronous metadata lookup with the domain allow-list
//! - [`janitor`] - Retention sweep over the task store
//! - [`lifecycle`] - Shutdown coordination

mod info;
mod janitor;
mod lifecycle;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use info::{clean_title, is_supported_url, truncate_description};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::fetcher::{CliMediaFetcher, MediaFetcher, NoOpMediaFetcher};
use crate::task::TaskStore;
use crate::types::{Event, TaskId, TaskSnapshot, TaskStatus};

/// Worker pool and shutdown state
#[derive(Clone)]
pub(crate) struct WorkerState {
    /// Semaphore bounding concurrent downloads (max_concurrent_downloads permits)
    pub(crate) concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// Number of workers currently holding a permit
    pub(crate) active_downloads: Arc<AtomicUsize>,
    /// Flag to indicate whether new submissions are accepted (false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Cancelled on shutdown to stop background loops
    pub(crate) shutdown_token: tokio_util::sync::CancellationToken,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Task store shared by handlers, workers and the janitor
    pub store: Arc<TaskStore>,
    /// External media fetcher
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Worker pool and shutdown state
    pub(crate) worker_state: WorkerState,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// Validates the configuration, creates the download directory and picks
    /// a fetcher: the configured yt-dlp binary, else one found on PATH, else
    /// a no-op fetcher that fails every download.
    ///
    /// # Errors
    ///
    /// [`FetchError::BinaryNotFound`] if `fetcher.ytdlp_path` is set but does
    /// not point at an existing file.
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn MediaFetcher> = if let Some(ref path) = config.fetcher.ytdlp_path {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(FetchError::BinaryNotFound(path.display().to_string()).into());
            }
            Arc::new(CliMediaFetcher::new(path.clone()))
        } else if config.fetcher.search_path {
            CliMediaFetcher::from_path()
                .map(|f| Arc::new(f) as Arc<dyn MediaFetcher>)
                .unwrap_or_else(|| Arc::new(NoOpMediaFetcher))
        } else {
            Arc::new(NoOpMediaFetcher)
        };

        Self::with_fetcher(config, fetcher).await
    }

    /// Create a MediaDownloader that uses the given fetcher
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        tracing::info!(
            fetcher = fetcher.name(),
            download_dir = %config.download.download_dir.display(),
            max_concurrent = config.download.max_concurrent_downloads,
            "Media fetcher initialized"
        );

        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let worker_state = WorkerState {
            concurrent_limit: Arc::new(tokio::sync::Semaphore::new(
                config.download.max_concurrent_downloads,
            )),
            active_downloads: Arc::new(AtomicUsize::new(0)),
            accepting_new: Arc::new(AtomicBool::new(true)),
            shutdown_token: tokio_util::sync::CancellationToken::new(),
        };

        Ok(Self {
            store: Arc::new(TaskStore::new()),
            fetcher,
            event_tx,
            config: Arc::new(config),
            worker_state,
        })
    }

    /// Subscribe to task events
    ///
    /// Each subscriber receives all events independently. A subscriber that
    /// falls more than 1000 events behind gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the active fetcher backend
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Number of downloads currently running
    pub fn active_downloads(&self) -> usize {
        self.worker_state.active_downloads.load(Ordering::SeqCst)
    }

    /// Whether new submissions are accepted
    pub fn is_accepting(&self) -> bool {
        self.worker_state.accepting_new.load(Ordering::SeqCst)
    }

    /// Status of a task as seen by polling clients
    pub fn status(&self, id: &TaskId) -> Result<TaskSnapshot> {
        Ok(self.store.get(id)?.snapshot())
    }

    /// Path and file name of a completed task's file
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for unknown ids
    /// - [`Error::NotComplete`] if the task has not completed
    /// - [`Error::FileMissing`] if the file is no longer on disk
    pub async fn completed_file(&self, id: &TaskId) -> Result<(PathBuf, String)> {
        let record = self.store.get(id)?;

        let (Some(path), Some(name)) = (record.filepath(), record.filename()) else {
            return Err(Error::NotComplete {
                id: id.clone(),
                status: record.status(),
            });
        };
        debug_assert_eq!(record.status(), TaskStatus::Completed);

        let path = path.to_path_buf();
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::FileMissing {
                id: id.clone(),
                path,
            });
        }

        Ok((path, name.to_string()))
    }

    /// Emit an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
