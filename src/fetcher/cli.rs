//! CLI-based media fetcher using the external yt-dlp binary

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use super::parser::{
    error_message, final_path_template, parse_final_path, parse_info_json, parse_progress_line,
    progress_template,
};
use super::traits::{DownloadOutput, DownloadRequest, MediaFetcher, RawMediaInfo};
use crate::error::FetchError;
use crate::progress::ProgressEvent;

/// CLI-based media fetcher
///
/// Runs `yt-dlp` once per operation. Metadata lookups use
/// `--dump-single-json --skip-download`; downloads stream progress lines on
/// stdout and report the final path after post-processing.
///
/// # Examples
///
/// ```no_run
/// use media_dl::fetcher::CliMediaFetcher;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let fetcher = CliMediaFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = CliMediaFetcher::from_path().expect("yt-dlp not found in PATH");
/// ```
pub struct CliMediaFetcher {
    binary_path: PathBuf,
}

impl CliMediaFetcher {
    /// Create a new CLI fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Uses the `which` crate to search for the `yt-dlp` binary.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Arguments for a metadata-only query
    pub(crate) fn info_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    /// Arguments for a download
    pub(crate) fn download_args(request: &DownloadRequest) -> Vec<String> {
        let output_template = request
            .output_dir
            .join(format!("%(title).{}s.%(ext)s", request.title_max_len));

        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--no-simulate".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            progress_template(),
            "--print".to_string(),
            final_path_template(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
        ];
        args.extend(request.profile.to_args());
        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> crate::Error {
        FetchError::SpawnFailed {
            tool: self.binary_path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl MediaFetcher for CliMediaFetcher {
    async fn fetch_info(&self, url: &str) -> crate::Result<RawMediaInfo> {
        let output = Command::new(&self.binary_path)
            .args(Self::info_args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Failed {
                exit_code: output.status.code(),
                message: error_message(&stderr, output.status.code()),
            }
            .into());
        }

        parse_info_json(&output.stdout)
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        progress_tx: UnboundedSender<ProgressEvent>,
    ) -> crate::Result<DownloadOutput> {
        tracing::debug!(
            fetcher = self.name(),
            url = %request.url,
            profile = ?request.profile,
            "Spawning yt-dlp download"
        );

        let mut child = Command::new(&self.binary_path)
            .args(Self::download_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future (e.g. on timeout) must not leave yt-dlp running.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FetchError::InvalidOutput("stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FetchError::InvalidOutput("stderr not captured".to_string()))?;

        // Drain stderr concurrently so a chatty process cannot fill the pipe and stall.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        });

        let reported = read_download_output(BufReader::new(stdout), &progress_tx).await?;

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(FetchError::Failed {
                exit_code: status.code(),
                message: error_message(&stderr, status.code()),
            }
            .into());
        }

        let filepath = reported.ok_or_else(|| {
            FetchError::InvalidOutput("yt-dlp did not report an output file".to_string())
        })?;

        Ok(DownloadOutput { filepath })
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

/// Consume yt-dlp's stdout during a download
///
/// Progress lines are forwarded to `progress_tx`. Returns the path printed
/// after post-processing, else the last file reported as finished. Lines are
/// decoded lossily since titles end up in file names verbatim.
async fn read_download_output<R>(
    reader: R,
    progress_tx: &UnboundedSender<ProgressEvent>,
) -> std::io::Result<Option<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut final_path: Option<PathBuf> = None;
    let mut last_finished: Option<PathBuf> = None;
    let mut segments = reader.split(b'\n');

    while let Some(bytes) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&bytes);
        if let Some(event) = parse_progress_line(&line) {
            if let ProgressEvent::Finished {
                filename: Some(ref name),
            } = event
            {
                last_finished = Some(PathBuf::from(name));
            }
            // The receiver may be gone; the download still runs to completion.
            let _ = progress_tx.send(event);
        } else if let Some(path) = parse_final_path(&line) {
            final_path = Some(path);
        }
    }

    Ok(final_path.or(last_finished))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FormatProfile;

    fn request(profile: FormatProfile) -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            output_dir: PathBuf::from("/tmp/video_downloads"),
            profile,
            title_max_len: 100,
        }
    }

    #[test]
    fn info_args_skip_download() {
        let args = CliMediaFetcher::info_args("https://vimeo.com/1");
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        assert_eq!(args.last().unwrap(), "https://vimeo.com/1");
    }

    #[test]
    fn download_args_for_video_cap_height_and_set_output_template() {
        let args = CliMediaFetcher::download_args(&request(FormatProfile::Video { max_height: 720 }));

        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], "best[height<=720]");

        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "/tmp/video_downloads/%(title).100s.%(ext)s");

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--extract-audio".to_string()));
        // URL comes last, after the option terminator
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn download_args_for_audio_extract_and_transcode() {
        let args = CliMediaFetcher::download_args(&request(FormatProfile::AudioOnly {
            codec: "mp3".to_string(),
            bitrate_kbps: 192,
        }));
        assert!(args.contains(&"bestaudio/best".to_string()));
        assert!(args.contains(&"--extract-audio".to_string()));
        assert!(args.contains(&"192K".to_string()));
    }

    #[test]
    fn from_path_consistency_with_which_crate() {
        let which_result = which::which("yt-dlp");
        let from_path_result = CliMediaFetcher::from_path();
        assert_eq!(which_result.is_ok(), from_path_result.is_some());
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_failure() {
        let fetcher = CliMediaFetcher::new(PathBuf::from("/nonexistent/yt-dlp-binary-xyz"));
        let err = fetcher.fetch_info("https://youtube.com/x").await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Fetch(FetchError::SpawnFailed { .. })
        ));

        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let err = fetcher
            .download(&request(FormatProfile::Video { max_height: 480 }), tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Fetch(FetchError::SpawnFailed { .. })
        ));
    }

    #[tokio::test]
    async fn stdout_with_invalid_utf8_is_still_read_to_the_end() {
        let mut stdout = Vec::new();
        stdout.extend_from_slice(b"[media-dl:progress] downloading 500 1000 NA clip.webm\n");
        stdout.extend_from_slice(b"[youtube] title with \xff\xfe bytes\r\n");
        stdout.extend_from_slice(b"[media-dl:progress] finished 1000 1000 NA /tmp/clip.webm\n");
        stdout.extend_from_slice(b"[media-dl:file] /tmp/clip \xff.mp4");

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let reported = read_download_output(BufReader::new(&stdout[..]), &tx)
            .await
            .unwrap();

        let path = reported.unwrap();
        assert!(path.to_string_lossy().starts_with("/tmp/clip "));
        assert!(path.to_string_lossy().ends_with(".mp4"));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ProgressEvent::Finished { .. }));
    }

    #[tokio::test]
    async fn last_finished_file_is_used_without_a_final_path_line() {
        let stdout = b"[media-dl:progress] finished 10 10 NA /tmp/a.m4a\n".to_vec();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let reported = read_download_output(BufReader::new(&stdout[..]), &tx)
            .await
            .unwrap();
        assert_eq!(reported, Some(PathBuf::from("/tmp/a.m4a")));
    }

    #[tokio::test]
    #[ignore] // Requires yt-dlp binary in PATH and network access
    async fn fetch_info_from_real_site() {
        let Some(fetcher) = CliMediaFetcher::from_path() else {
            println!("Skipping test: yt-dlp binary not found in PATH");
            return;
        };
        let info = fetcher
            .fetch_info("https://www.youtube.com/watch?v=jNQXAC9IVRw")
            .await
            .unwrap();
        assert!(info.title.is_some());
    }
}
