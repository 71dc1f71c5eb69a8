use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod catalog;
mod config;
mod fetch;
mod ids;
mod mood;
mod pipeline;
mod playlist;
mod processor;

use crate::config::Config;
use crate::fetch::{WallhavenClient, YtDlpResolver};
use crate::pipeline::PipelineDriver;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Lofi Catalog Builder")
        .version("0.1.0")
        .about("Scrapes playlist items into a mood-tagged lofi catalog")
        .arg(
            Arg::new("playlist")
                .short('p')
                .long("playlist")
                .value_name("FILE")
                .help("Playlist file (JSON array of URLs or descriptors)")
                .default_value("playlist.json"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for catalog files and downloaded assets"),
        )
        .arg(
            Arg::new("delay-ms")
                .long("delay-ms")
                .value_name("MS")
                .help("Pause between items in milliseconds"),
        )
        .arg(
            Arg::new("no-thumbnails")
                .long("no-thumbnails")
                .help("Skip thumbnail downloads")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-audio")
                .long("no-audio")
                .help("Skip audio downloads")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-wallpapers")
                .long("no-wallpapers")
                .help("Skip mood wallpaper fetches")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "lofi_catalog=debug,info"
        } else {
            "lofi_catalog=info,warn"
        })
        .init();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_env();

    // CLI overrides
    if let Some(output_dir) = matches.get_one::<String>("output-dir") {
        config.storage.output_dir = PathBuf::from(output_dir);
    }
    if let Some(delay) = matches.get_one::<String>("delay-ms") {
        config.pipeline.delay_ms = delay.parse()?;
    }
    if matches.get_flag("no-thumbnails") {
        config.pipeline.fetch_thumbnail = false;
    }
    if matches.get_flag("no-audio") {
        config.pipeline.fetch_audio = false;
    }
    if matches.get_flag("no-wallpapers") {
        config.pipeline.fetch_wallpaper = false;
    }
    config.validate()?;

    let playlist_path = PathBuf::from(matches.get_one::<String>("playlist").unwrap());

    info!("🎧 Lofi Catalog Builder starting...");
    info!("📃 Playlist: {}", playlist_path.display());
    info!("📂 Output directory: {}", config.storage.output_dir.display());

    let resolver = Arc::new(YtDlpResolver::new(&config.fetch));
    let wallpapers = Arc::new(WallhavenClient::new(config.fetch.request_timeout_seconds));

    let driver = PipelineDriver::new(config, resolver, wallpapers);

    // Per-item failures are contained inside the run; only an unreadable
    // playlist reaches this boundary and exits non-zero.
    let stats = driver.run(&playlist_path).await?;

    info!("✅ Saved: {}", stats.saved);
    info!("⏭️ Skipped: {}", stats.skipped);
    info!("❌ Failed: {}", stats.failed);

    Ok(())
}
