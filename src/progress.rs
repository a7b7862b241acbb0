//! Progress translation
//!
//! Maps the fetcher's transfer events onto the single 0-100 scale clients
//! poll. The scale is layered on fixed checkpoints:
//!
//! | value | meaning |
//! |---|---|
//! | 10 | task accepted by a worker |
//! | 30 | format configuration resolved, transfer not started |
//! | 30..=90 | transferring, `30 + floor(0.6 * pct)` |
//! | 95 | transfer finished, post-processing pending |
//! | 100 | fully completed |

use serde::{Deserialize, Serialize};

/// Worker picked up the task
pub const ACCEPTED: u8 = 10;

/// Format selection resolved, transfer about to start
pub const CONFIGURED: u8 = 30;

/// Transfer done, post-processing (e.g. audio extraction) may still run
pub const TRANSFER_FINISHED: u8 = 95;

/// Task completed
pub const COMPLETED: u8 = 100;

/// A progress report from the media fetcher
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Bytes are being transferred
    Downloading {
        /// Bytes received so far
        downloaded_bytes: u64,
        /// Exact total size, when the server reported one
        total_bytes: Option<u64>,
        /// Estimated total size, when only an estimate is available
        total_bytes_estimate: Option<u64>,
    },
    /// The transfer of one file finished
    Finished {
        /// The file the fetcher wrote, if reported
        filename: Option<String>,
    },
}

/// Translate a progress event into a progress value
///
/// Returns `None` when the event carries no usable total, in which case the
/// caller keeps its last value.
pub fn translate(event: &ProgressEvent) -> Option<u8> {
    match event {
        ProgressEvent::Downloading {
            downloaded_bytes,
            total_bytes,
            total_bytes_estimate,
        } => {
            let total = total_bytes
                .filter(|t| *t > 0)
                .or(total_bytes_estimate.filter(|t| *t > 0))?;
            Some(transfer_progress(*downloaded_bytes, total))
        }
        ProgressEvent::Finished { .. } => Some(TRANSFER_FINISHED),
    }
}

fn transfer_progress(downloaded: u64, total: u64) -> u8 {
    // Estimates can undershoot the real size; clamp instead of overflowing the band.
    let pct = (u128::from(downloaded) * 100 / u128::from(total)).min(100);
    CONFIGURED + (pct * 6 / 10) as u8
}
