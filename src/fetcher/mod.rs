//! External media fetching
//!
//! The actual extraction, format negotiation and transcoding is delegated to
//! an external tool. This module defines the seam the rest of the crate talks
//! to, plus its implementations:
//!
//! - [`CliMediaFetcher`]: drives the `yt-dlp` binary as a subprocess
//! - [`NoOpMediaFetcher`]: stand-in when no binary is available
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::fetcher::{CliMediaFetcher, MediaFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = CliMediaFetcher::from_path().expect("yt-dlp not found");
//!     let info = fetcher.fetch_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     println!("{:?}", info.title);
//!     Ok(())
//! }
//! ```

mod cli;
mod format;
mod noop;
mod parser;
mod traits;

pub use cli::CliMediaFetcher;
pub use format::FormatProfile;
pub use noop::NoOpMediaFetcher;
pub use parser::{parse_final_path, parse_progress_line};
pub use traits::{DownloadOutput, DownloadRequest, MediaFetcher, RawMediaInfo};
