//! media-dl server binary
//!
//! Serves the REST API, runs the retention janitor and shuts down cleanly on
//! SIGINT/SIGTERM.

use clap::Parser;
use media_dl::{Config, MediaDownloader, run_with_shutdown};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Background media download server
#[derive(Debug, Parser)]
#[command(name = "media-dl", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MEDIA_DL_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long, env = "MEDIA_DL_BIND")]
    bind: Option<SocketAddr>,

    /// Directory downloads are written to (overrides the config file)
    #[arg(short, long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.api.bind_address = bind;
    }
    if let Some(dir) = args.download_dir {
        config.download.download_dir = dir;
    }

    let downloader = Arc::new(MediaDownloader::new(config).await?);
    let janitor = downloader.spawn_janitor();

    tokio::select! {
        result = media_dl::api::start_api_server(downloader.clone(), downloader.get_config()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "API server failed");
                downloader.shutdown().await?;
                janitor.await.ok();
                return Err(e.into());
            }
        }
        result = run_with_shutdown(&downloader) => {
            result?;
        }
    }

    janitor.await.ok();
    tracing::info!("Exiting");
    Ok(())
}
