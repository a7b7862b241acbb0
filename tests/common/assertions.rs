//! Polling helpers for integration tests

use media_dl::{MediaDownloader, TaskId, TaskSnapshot};
use std::time::Duration;

/// Poll a task until it is terminal, returning every snapshot observed
///
/// Panics if `timeout` elapses first.
pub async fn poll_until_terminal(
    downloader: &MediaDownloader,
    id: &TaskId,
    timeout: Duration,
) -> Vec<TaskSnapshot> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut seen = Vec::new();
    loop {
        let snapshot = downloader.status(id).expect("task should exist");
        let done = snapshot.status.is_terminal();
        seen.push(snapshot);
        if done {
            return seen;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {id} still running after {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Assert progress never went backwards across the snapshots
pub fn assert_monotonic(seen: &[TaskSnapshot]) {
    for pair in seen.windows(2) {
        assert!(
            pair[0].progress <= pair[1].progress,
            "progress decreased from {} to {}",
            pair[0].progress,
            pair[1].progress
        );
    }
}
