//! Metadata lookup for a URL, without downloading.

use regex::Regex;
use std::sync::LazyLock;

use super::MediaDownloader;
use crate::error::{Error, Result};
use crate::fetcher::RawMediaInfo;
use crate::types::MediaInfo;

/// Characters that are unsafe in file names on common filesystems
static UNSAFE_TITLE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"[<>:"/\\|?*]"#).expect("title pattern is valid")
});

/// Maximum description length, in characters
const DESCRIPTION_MAX_CHARS: usize = 200;

impl MediaDownloader {
    /// Look up display metadata for `url`
    ///
    /// The URL must match the configured allow-list before the fetcher is
    /// contacted.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `url` is empty
    /// - [`Error::UnsupportedSite`] if no allowed domain matches
    /// - [`Error::Fetch`] if the fetcher fails
    pub async fn lookup_info(&self, url: &str) -> Result<MediaInfo> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Validation("URL required".to_string()));
        }
        if !is_supported_url(url, &self.config.fetcher.supported_domains) {
            tracing::debug!(url, "Rejected info lookup for unsupported site");
            return Err(Error::UnsupportedSite(url.to_string()));
        }

        let raw = self.fetcher.fetch_info(url).await.inspect_err(|e| {
            tracing::warn!(url, error = %e, "Info lookup failed");
        })?;
        Ok(build_media_info(raw))
    }
}

/// Whether `url` contains any of the allowed domains
pub fn is_supported_url(url: &str, domains: &[String]) -> bool {
    domains.iter().any(|domain| url.contains(domain.as_str()))
}

/// Remove filesystem-unsafe characters from a title
pub fn clean_title(title: &str) -> String {
    UNSAFE_TITLE_CHARS.replace_all(title, "").into_owned()
}

/// Cut a description to 200 characters, appending `...` when shortened
pub fn truncate_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &description[..cut]),
        None => description.to_string(),
    }
}

fn build_media_info(raw: RawMediaInfo) -> MediaInfo {
    MediaInfo {
        title: clean_title(raw.title.as_deref().unwrap_or("Unknown title")),
        duration: raw
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round() as u64)
            .unwrap_or(0),
        uploader: raw
            .uploader
            .unwrap_or_else(|| "Unknown uploader".to_string()),
        thumbnail: raw.thumbnail.unwrap_or_default(),
        description: raw
            .description
            .as_deref()
            .map(truncate_description)
            .unwrap_or_default(),
        view_count: raw.view_count.unwrap_or(0),
    }
}
