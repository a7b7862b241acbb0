//! Core types for media-dl

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a download task
///
/// Opaque to clients. Generated as a UUID v7, so ids sort by creation time
/// while staying unique under concurrent submission.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh task id
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted, waiting for a worker
    Pending,
    /// Worker is running the external download
    Downloading,
    /// File is on disk and ready for retrieval
    Completed,
    /// Failed with error
    Error,
}

impl TaskStatus {
    /// Whether no further transitions can leave this state
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    /// Lowercase name as used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested output quality
///
/// A closed set. Anything unrecognized falls back to [`Quality::P1080`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Quality {
    /// Best audio stream, transcoded to a lossy audio codec
    #[serde(rename = "audio")]
    Audio,
    /// Best stream capped at 480 lines
    #[serde(rename = "480p")]
    P480,
    /// Best stream capped at 720 lines
    #[serde(rename = "720p")]
    P720,
    /// Best stream capped at 1080 lines
    #[default]
    #[serde(rename = "1080p")]
    P1080,
}

impl Quality {
    /// Parse a client-supplied quality selector, defaulting to 1080p
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("audio") => Quality::Audio,
            Some("480p") => Quality::P480,
            Some("720p") => Quality::P720,
            _ => Quality::P1080,
        }
    }

    /// Maximum video height, or `None` for audio-only output
    pub fn max_height(self) -> Option<u32> {
        match self {
            Quality::Audio => None,
            Quality::P480 => Some(480),
            Quality::P720 => Some(720),
            Quality::P1080 => Some(1080),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Audio => f.write_str("audio"),
            Quality::P480 => f.write_str("480p"),
            Quality::P720 => f.write_str("720p"),
            Quality::P1080 => f.write_str("1080p"),
        }
    }
}

/// Client-facing view of a task, as returned by the status endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskSnapshot {
    /// Current status
    pub status: TaskStatus,
    /// Progress on a 0-100 scale
    pub progress: u8,
    /// Final file name, present once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Failure description, present once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Cleaned-up media metadata returned by the info endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Title with filesystem-unsafe characters removed
    pub title: String,
    /// Duration in seconds (0 when unknown)
    pub duration: u64,
    /// Uploader name
    pub uploader: String,
    /// Thumbnail URL (empty when unknown)
    pub thumbnail: String,
    /// Description, truncated to 200 characters
    pub description: String,
    /// View count (0 when unknown)
    pub view_count: u64,
}

/// Events emitted while tasks move through their lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task was accepted
    TaskCreated {
        /// Task ID
        id: TaskId,
        /// Submitted URL
        url: String,
        /// Requested quality
        quality: Quality,
    },
    /// A task's progress value increased
    Progress {
        /// Task ID
        id: TaskId,
        /// New progress value
        progress: u8,
    },
    /// A task finished successfully
    Completed {
        /// Task ID
        id: TaskId,
        /// Final file name
        filename: String,
    },
    /// A task failed
    Failed {
        /// Task ID
        id: TaskId,
        /// Error message
        error: String,
    },
    /// A task was evicted by the retention sweep
    Removed {
        /// Task ID
        id: TaskId,
    },
    /// The downloader is shutting down
    Shutdown,
}
