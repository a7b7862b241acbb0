//! Lifecycle state of a single download task.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::progress;
use crate::types::{Quality, TaskSnapshot, TaskStatus};

/// Mutable state of one download
///
/// Fields are private; state changes go through the transition methods,
/// which keep these invariants:
/// - `error_message` is set if and only if the status is `error`
/// - `filename`/`filepath` are set if and only if the status is `completed`
/// - `progress` never decreases
/// - terminal states are never left
#[derive(Clone, Debug)]
pub struct TaskRecord {
    url: String,
    quality: Quality,
    status: TaskStatus,
    progress: u8,
    filename: Option<String>,
    filepath: Option<PathBuf>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Create a pending record stamped with the current time
    pub fn new(url: impl Into<String>, quality: Quality) -> Self {
        Self::with_created_at(url, quality, Utc::now())
    }

    /// Create a pending record with an explicit creation time
    pub fn with_created_at(
        url: impl Into<String>,
        quality: Quality,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            quality,
            status: TaskStatus::Pending,
            progress: 0,
            filename: None,
            filepath: None,
            error_message: None,
            created_at,
        }
    }

    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requested quality
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Current status
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Current progress (0-100)
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Final file name, once completed
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Absolute path of the downloaded file, once completed
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Failure description, once failed
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Age relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Move from `pending` to `downloading` at the accepted checkpoint
    ///
    /// Returns `false` if the record was not pending.
    pub fn start(&mut self) -> bool {
        if self.status != TaskStatus::Pending {
            return false;
        }
        self.status = TaskStatus::Downloading;
        self.raise_progress(progress::ACCEPTED);
        true
    }

    /// Raise progress while downloading
    ///
    /// Lower values are ignored. Returns `true` if the stored value changed.
    /// Values are capped below [`progress::COMPLETED`]; only
    /// [`complete`](Self::complete) reaches 100.
    pub fn advance(&mut self, value: u8) -> bool {
        if self.status != TaskStatus::Downloading {
            return false;
        }
        self.raise_progress(value.min(progress::TRANSFER_FINISHED))
    }

    /// Mark the task completed with its final file
    ///
    /// Returns `false` if the record was already terminal.
    pub fn complete(&mut self, filepath: PathBuf) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let filename = filepath
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| filepath.to_string_lossy().into_owned());

        self.status = TaskStatus::Completed;
        self.progress = progress::COMPLETED;
        self.filename = Some(filename);
        self.filepath = Some(filepath);
        true
    }

    /// Mark the task failed
    ///
    /// An empty message is replaced so the error state always carries text.
    /// Progress is left where it was. Returns `false` if already terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let message = message.into();
        let message = if message.trim().is_empty() {
            "download failed".to_string()
        } else {
            message
        };

        self.status = TaskStatus::Error;
        self.error_message = Some(message);
        true
    }

    /// Client-facing view of this record
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            status: self.status,
            progress: self.progress,
            filename: self.filename.clone(),
            error_message: self.error_message.clone(),
        }
    }

    fn raise_progress(&mut self, value: u8) -> bool {
        if value > self.progress {
            self.progress = value;
            true
        } else {
            false
        }
    }
}
