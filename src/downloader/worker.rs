//! Submission and the per-task download worker.
//!
//! One worker runs per accepted submission. Workers are never joined by the
//! request that created them and cannot be cancelled; their outcome is only
//! observable through the task record.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;

use super::MediaDownloader;
use crate::error::{Error, FetchError, Result};
use crate::fetcher::{DownloadOutput, DownloadRequest, FormatProfile};
use crate::progress::{self, ProgressEvent};
use crate::types::{Event, Quality, TaskId};

impl MediaDownloader {
    /// Accept a download submission
    ///
    /// Creates a pending task, spawns its worker and returns immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `url` is empty
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) was called
    pub fn submit(&self, url: &str, quality: Quality) -> Result<TaskId> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Validation("URL required".to_string()));
        }
        if !self.worker_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let id = self.store.create(url, quality);
        tracing::info!(task_id = %id, url, %quality, "Download task created");
        self.emit_event(Event::TaskCreated {
            id: id.clone(),
            url: url.to_string(),
            quality,
        });

        self.spawn_worker(id.clone(), url.to_string(), quality);
        Ok(id)
    }

    /// Spawn a supervised worker for an existing pending task
    ///
    /// The supervisor awaits the worker so that a panic inside it still
    /// lands in the task record as an error.
    pub(crate) fn spawn_worker(&self, id: TaskId, url: String, quality: Quality) {
        let downloader = self.clone();
        tokio::spawn(async move {
            let worker = tokio::spawn({
                let downloader = downloader.clone();
                let id = id.clone();
                async move { downloader.run_worker(id, url, quality).await }
            });

            if let Err(e) = worker.await {
                tracing::error!(task_id = %id, error = %e, "Download worker aborted");
                downloader.fail_task(&id, format!("download worker aborted: {e}"));
            }
        });
    }

    async fn run_worker(&self, id: TaskId, url: String, quality: Quality) {
        let _permit = match self
            .worker_state
            .concurrent_limit
            .clone()
            .acquire_owned()
            .await
        {
            Ok(permit) => permit,
            Err(_) => {
                self.fail_task(&id, "downloader is shutting down");
                return;
            }
        };
        let _active = ActiveGuard::new(self);

        match self.store.update(&id, |r| r.start()) {
            Ok(true) => self.emit_event(Event::Progress {
                id: id.clone(),
                progress: progress::ACCEPTED,
            }),
            Ok(false) => {
                tracing::warn!(task_id = %id, "Task was not pending, worker exiting");
                return;
            }
            Err(_) => {
                tracing::debug!(task_id = %id, "Task removed before its worker started");
                return;
            }
        }
        tracing::info!(task_id = %id, %quality, "Download started");

        let profile = FormatProfile::for_quality(quality, &self.config.fetcher);
        self.set_progress(&id, progress::CONFIGURED);

        let request = DownloadRequest {
            url,
            output_dir: self.config.download.download_dir.clone(),
            profile,
            title_max_len: self.config.fetcher.title_max_len,
        };

        match self.fetch_with_progress(&id, &request).await {
            Ok(output) => self.finish_task(&id, output.filepath).await,
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "Download failed");
                self.fail_task(&id, failure_message(&e));
            }
        }
    }

    /// Run the fetcher, applying its progress events to the record as they arrive
    async fn fetch_with_progress(
        &self,
        id: &TaskId,
        request: &DownloadRequest,
    ) -> Result<DownloadOutput> {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let download = self.fetcher.download(request, progress_tx);
        let timeout = self.config.download.download_timeout;

        let fetch = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, download).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::TimedOut {
                        secs: limit.as_secs(),
                    }
                    .into()),
                },
                None => download.await,
            }
        };
        tokio::pin!(fetch);

        let result = loop {
            tokio::select! {
                biased;
                Some(event) = progress_rx.recv() => self.apply_progress(id, &event),
                result = &mut fetch => break result,
            }
        };

        // Events sent just before the fetcher returned
        while let Ok(event) = progress_rx.try_recv() {
            self.apply_progress(id, &event);
        }

        result
    }

    fn apply_progress(&self, id: &TaskId, event: &ProgressEvent) {
        if let ProgressEvent::Finished { filename } = event {
            tracing::debug!(task_id = %id, filename = ?filename, "Transfer finished");
        }
        if let Some(value) = progress::translate(event) {
            self.set_progress(id, value);
        }
    }

    fn set_progress(&self, id: &TaskId, value: u8) {
        match self
            .store
            .update(id, |r| r.advance(value).then(|| r.progress()))
        {
            Ok(Some(progress)) => self.emit_event(Event::Progress {
                id: id.clone(),
                progress,
            }),
            Ok(None) => {}
            Err(_) => tracing::debug!(task_id = %id, "Progress for a task no longer stored"),
        }
    }

    async fn finish_task(&self, id: &TaskId, reported: PathBuf) {
        // Resolves to an absolute path and proves the file exists.
        let filepath = match tokio::fs::canonicalize(&reported).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(task_id = %id, path = %reported.display(), error = %e, "Output file missing");
                self.fail_task(
                    id,
                    format!("output file not found: {}", reported.display()),
                );
                return;
            }
        };

        match self.store.update(id, |r| {
            r.complete(filepath.clone())
                .then(|| r.filename().map(str::to_string))
                .flatten()
        }) {
            Ok(Some(filename)) => {
                tracing::info!(task_id = %id, filename = %filename, "Download completed");
                self.emit_event(Event::Completed {
                    id: id.clone(),
                    filename,
                });
            }
            Ok(None) => {
                tracing::warn!(task_id = %id, "Task already terminal, completion ignored");
            }
            Err(_) => {
                // Evicted while downloading: nothing references the file any more.
                tracing::debug!(task_id = %id, "Task removed during download, deleting output");
                let _ = tokio::fs::remove_file(&filepath).await;
            }
        }
    }

    pub(crate) fn fail_task(&self, id: &TaskId, message: impl Into<String>) {
        let message = message.into();
        match self.store.update(id, |r| r.fail(message.clone())) {
            Ok(true) => self.emit_event(Event::Failed {
                id: id.clone(),
                error: message,
            }),
            Ok(false) => {}
            Err(_) => tracing::debug!(task_id = %id, "Failure for a task no longer stored"),
        }
    }
}

/// Message stored on the task record for a failed download
fn failure_message(error: &Error) -> String {
    match error {
        Error::Fetch(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

/// Counts a worker as active for as long as it is alive
struct ActiveGuard<'a> {
    downloader: &'a MediaDownloader,
}

impl<'a> ActiveGuard<'a> {
    fn new(downloader: &'a MediaDownloader) -> Self {
        downloader
            .worker_state
            .active_downloads
            .fetch_add(1, Ordering::SeqCst);
        Self { downloader }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.downloader
            .worker_state
            .active_downloads
            .fetch_sub(1, Ordering::SeqCst);
    }
}
