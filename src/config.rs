//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Download behavior configuration (directories, concurrency, timeouts)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Download directory (default: "<system temp>/video_downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum concurrent downloads (default: 4)
    ///
    /// Submissions beyond this limit stay `pending` until a slot frees up.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Per-download timeout in seconds (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    #[schema(value_type = Option<u64>)]
    pub download_timeout: Option<Duration>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            download_timeout: None,
        }
    }
}

/// Retention sweep configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetentionConfig {
    /// Interval between sweeps in seconds (default: 3600)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub sweep_interval: Duration,

    /// Maximum task age in seconds before eviction (default: 7200)
    #[serde(default = "default_max_age", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub max_age: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sweep_interval: default_sweep_interval(),
            max_age: default_max_age(),
        }
    }
}

/// External media fetcher (yt-dlp) configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FetcherConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Codec for audio-only downloads (default: "mp3")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Target bitrate for audio-only downloads in kbps (default: 192)
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// Maximum number of title characters used in output file names (default: 100)
    #[serde(default = "default_title_max_len")]
    pub title_max_len: usize,

    /// Domains accepted by the info endpoint (substring match)
    #[serde(default = "default_supported_domains")]
    pub supported_domains: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            audio_codec: default_audio_codec(),
            audio_bitrate_kbps: default_audio_bitrate(),
            title_max_len: default_title_max_len(),
            supported_domains: default_supported_domains(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Directory holding the static frontend served at `/` (None = not served)
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            frontend_dir: None,
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig) — directory, concurrency, timeout
/// - [`retention`](RetentionConfig) — sweep interval and maximum task age
/// - [`fetcher`](FetcherConfig) — yt-dlp location, audio settings, allow-list
/// - [`api`](ApiConfig) — HTTP server settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retention sweep settings
    #[serde(default)]
    pub retention: RetentionConfig,

    /// External fetcher settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the downloader cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }
        if self.retention.sweep_interval.is_zero() {
            return Err(Error::Config {
                message: "sweep_interval must be greater than zero".to_string(),
                key: Some("sweep_interval".to_string()),
            });
        }
        if self.fetcher.title_max_len == 0 {
            return Err(Error::Config {
                message: "title_max_len must be at least 1".to_string(),
                key: Some("title_max_len".to_string()),
            });
        }
        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("video_downloads")
}

fn default_max_concurrent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(3600)
}

fn default_max_age() -> Duration {
    Duration::from_secs(7200)
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_title_max_len() -> usize {
    100
}

fn default_supported_domains() -> Vec<String> {
    [
        "youtube.com",
        "youtu.be",
        "vimeo.com",
        "dailymotion.com",
        "twitter.com",
        "x.com",
        "instagram.com",
        "facebook.com",
        "tiktok.com",
        "twitch.tv",
        "soundcloud.com",
        "reddit.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
