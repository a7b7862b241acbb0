//! Mapping from requested quality to fetcher configuration.

use crate::config::FetcherConfig;
use crate::types::Quality;

/// Format selection and post-processing for one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatProfile {
    /// Best audio stream, transcoded to `codec` at `bitrate_kbps`
    AudioOnly {
        /// Target codec (e.g. "mp3")
        codec: String,
        /// Target bitrate in kbps
        bitrate_kbps: u32,
    },
    /// Best single stream no taller than `max_height`
    Video {
        /// Maximum vertical resolution
        max_height: u32,
    },
}

impl FormatProfile {
    /// Resolve the profile for a quality selector
    pub fn for_quality(quality: Quality, config: &FetcherConfig) -> Self {
        match quality.max_height() {
            None => FormatProfile::AudioOnly {
                codec: config.audio_codec.clone(),
                bitrate_kbps: config.audio_bitrate_kbps,
            },
            Some(max_height) => FormatProfile::Video { max_height },
        }
    }

    /// yt-dlp format selector
    pub fn format_selector(&self) -> String {
        match self {
            FormatProfile::AudioOnly { .. } => "bestaudio/best".to_string(),
            FormatProfile::Video { max_height } => format!("best[height<={max_height}]"),
        }
    }

    /// yt-dlp arguments selecting the format and any post-processing
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format_selector()];
        if let FormatProfile::AudioOnly {
            codec,
            bitrate_kbps,
        } = self
        {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                codec.clone(),
                "--audio-quality".to_string(),
                format!("{bitrate_kbps}K"),
            ]);
        }
        args
    }

    /// Whether the output is audio only
    pub fn is_audio_only(&self) -> bool {
        matches!(self, FormatProfile::AudioOnly { .. })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_quality_extracts_and_transcodes() {
        let profile = FormatProfile::for_quality(Quality::Audio, &FetcherConfig::default());
        assert!(profile.is_audio_only());
        assert_eq!(
            profile.to_args(),
            vec![
                "-f",
                "bestaudio/best",
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K"
            ]
        );
    }

    #[test]
    fn video_qualities_cap_height() {
        let config = FetcherConfig::default();
        for (quality, selector) in [
            (Quality::P480, "best[height<=480]"),
            (Quality::P720, "best[height<=720]"),
            (Quality::P1080, "best[height<=1080]"),
        ] {
            let profile = FormatProfile::for_quality(quality, &config);
            assert!(!profile.is_audio_only());
            assert_eq!(profile.to_args(), vec!["-f", selector]);
        }
    }

    #[test]
    fn unrecognized_quality_resolves_to_1080p_cap() {
        let profile =
            FormatProfile::for_quality(Quality::parse(Some("best")), &FetcherConfig::default());
        assert_eq!(profile, FormatProfile::Video { max_height: 1080 });
    }

    #[test]
    fn audio_settings_follow_config() {
        let config = FetcherConfig {
            audio_codec: "opus".to_string(),
            audio_bitrate_kbps: 128,
            ..Default::default()
        };
        let profile = FormatProfile::for_quality(Quality::Audio, &config);
        let args = profile.to_args();
        assert!(args.contains(&"opus".to_string()));
        assert!(args.contains(&"128K".to_string()));
    }
}
