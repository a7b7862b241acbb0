//! Shutdown coordination.

use std::sync::atomic::Ordering;

use super::MediaDownloader;
use crate::error::Result;
use crate::types::Event;

impl MediaDownloader {
    /// Stop accepting work and stop the janitor
    ///
    /// Running downloads are not interrupted; they run to completion or
    /// failure and keep updating their records. Tasks still waiting for a
    /// download slot fail with "downloader is shutting down".
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` so callers can treat it like
    /// the other lifecycle operations.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating shutdown");

        self.worker_state
            .accepting_new
            .store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        self.worker_state.shutdown_token.cancel();
        self.worker_state.concurrent_limit.close();

        let active = self.active_downloads();
        if active > 0 {
            tracing::info!(
                active_downloads = active,
                "Leaving in-flight downloads to finish on their own"
            );
        }

        self.emit_event(Event::Shutdown);

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
