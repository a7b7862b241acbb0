//! Retention sweep over the task store.

use chrono::{DateTime, Utc};
use tokio::time::{Instant, MissedTickBehavior};

use super::MediaDownloader;
use crate::types::Event;

impl MediaDownloader {
    /// Spawn the janitor loop
    ///
    /// Sweeps every `retention.sweep_interval`, first sweep one interval after
    /// start. The loop exits when [`shutdown`](Self::shutdown) is called.
    pub fn spawn_janitor(&self) -> tokio::task::JoinHandle<()> {
        let downloader = self.clone();
        let period = self.config.retention.sweep_interval;
        let shutdown = self.worker_state.shutdown_token.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                sweep_interval_secs = period.as_secs(),
                max_age_secs = downloader.config.retention.max_age.as_secs(),
                "Janitor started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        downloader.sweep().await;
                    }
                    _ = shutdown.cancelled() => {
                        tracing::info!("Janitor stopped");
                        break;
                    }
                }
            }
        })
    }

    /// Evict tasks older than the retention window, as of now
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// Evict tasks whose age at `now` exceeds the retention window
    ///
    /// Each record is removed from the store first, then the file of the
    /// removed record is deleted; deletion failures are logged and otherwise
    /// ignored. Records created or removed while the sweep runs are not
    /// errors. Returns the number of records evicted.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let max_age = chrono::Duration::from_std(self.config.retention.max_age)
            .unwrap_or(chrono::Duration::MAX);

        let mut removed = 0;
        for id in self.store.list_ids() {
            let Ok(record) = self.store.get(&id) else {
                continue;
            };
            if record.age(now) <= max_age {
                continue;
            }

            // The stored record may have completed since it was read.
            let Some(evicted) = self.store.delete(&id) else {
                continue;
            };
            removed += 1;

            if let Some(path) = evicted.filepath() {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    tracing::debug!(
                        task_id = %id,
                        path = %path.display(),
                        error = %e,
                        "Could not delete expired file"
                    );
                }
            }
            self.emit_event(Event::Removed { id });
        }

        if removed > 0 {
            tracing::info!(removed, remaining = self.store.len(), "Expired tasks swept");
        } else {
            tracing::debug!(remaining = self.store.len(), "Sweep found nothing to expire");
        }
        removed
    }
}
