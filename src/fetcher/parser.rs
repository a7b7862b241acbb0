//! Parser for yt-dlp command output
//!
//! The CLI fetcher asks yt-dlp to print machine-readable lines through
//! `--progress-template` and `--print`, tagged with the markers below so they
//! can be told apart from ordinary log output.

use std::path::PathBuf;

use super::traits::RawMediaInfo;
use crate::error::FetchError;
use crate::progress::ProgressEvent;

/// Prefix of progress lines
pub(crate) const PROGRESS_MARKER: &str = "[media-dl:progress]";

/// Prefix of the final-path line
pub(crate) const FILE_MARKER: &str = "[media-dl:file]";

/// Template passed to `--progress-template`
pub(crate) fn progress_template() -> String {
    format!(
        "download:{PROGRESS_MARKER} %(progress.status)s %(progress.downloaded_bytes)s \
         %(progress.total_bytes)s %(progress.total_bytes_estimate)s %(progress.filename)s"
    )
}

/// Template passed to `--print` to report the final file
pub(crate) fn final_path_template() -> String {
    format!("after_move:{FILE_MARKER} %(filepath)s")
}

/// Parse one progress line
///
/// Expected shape:
/// `[media-dl:progress] <status> <downloaded> <total> <estimate> <filename...>`
/// where missing numeric fields are printed as `NA` and estimates may be
/// fractional. Returns `None` for lines that are not progress reports or
/// carry a status other than `downloading`/`finished`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?.trim_start();
    let mut fields = rest.splitn(5, ' ');

    let status = fields.next()?;
    let downloaded = fields.next().and_then(parse_bytes);
    let total = fields.next().and_then(parse_bytes);
    let estimate = fields.next().and_then(parse_bytes);
    let filename = fields
        .next()
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "NA")
        .map(str::to_string);

    match status {
        "downloading" => Some(ProgressEvent::Downloading {
            downloaded_bytes: downloaded.unwrap_or(0),
            total_bytes: total,
            total_bytes_estimate: estimate,
        }),
        "finished" => Some(ProgressEvent::Finished { filename }),
        _ => None,
    }
}

/// Parse the final-path line printed after post-processing
pub fn parse_final_path(line: &str) -> Option<PathBuf> {
    let path = line.trim().strip_prefix(FILE_MARKER)?.trim();
    if path.is_empty() || path == "NA" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Parse the JSON document printed by `--dump-single-json`
pub(crate) fn parse_info_json(stdout: &[u8]) -> crate::Result<RawMediaInfo> {
    serde_json::from_slice(stdout)
        .map_err(|e| FetchError::InvalidOutput(format!("invalid metadata JSON: {e}")).into())
}

/// Pick the most useful error line from yt-dlp's stderr
///
/// yt-dlp prefixes fatal problems with `ERROR:`; the last one wins.
/// Falls back to the last non-empty line, then to a generic message.
pub(crate) fn error_message(stderr: &str, exit_code: Option<i32>) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("yt-dlp exited with status {code}"),
            None => "yt-dlp was terminated by a signal".to_string(),
        })
}

fn parse_bytes(field: &str) -> Option<u64> {
    if field == "NA" || field == "None" {
        return None;
    }
    if let Ok(value) = field.parse::<u64>() {
        return Some(value);
    }
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}
