use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::{MediaMetadata, MediaResolver};
use crate::config::FetchConfig;

/// Metadata and audio fetcher backed by the yt-dlp command line tool.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    bin: String,
    extra_headers: Vec<String>,
    audio_format: String,
}

impl YtDlpResolver {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            bin: config.ytdlp_bin.clone(),
            extra_headers: config.extra_headers.clone(),
            audio_format: config.audio_format.clone(),
        }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.args(["--no-check-certificates", "--no-warnings"]);
        for header in &self.extra_headers {
            cmd.arg("--add-header").arg(header);
        }
        cmd
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve_metadata(&self, url: &str) -> Result<MediaMetadata> {
        debug!("Fetching metadata via {} for {}", self.bin, url);

        let output = self
            .base_command()
            .args(["--dump-single-json", "--prefer-free-formats", "--no-playlist"])
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} failed for {}: {}",
                self.bin,
                url,
                stderr.trim()
            ));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;

        Ok(MediaMetadata {
            title: info["title"].as_str().map(str::to_string),
            description: info["description"].as_str().map(str::to_string),
            thumbnail_url: info["thumbnail"].as_str().map(str::to_string),
            duration_seconds: info["duration"].as_f64(),
        })
    }

    async fn download_audio(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading audio via {} to {}", self.bin, dest.display());

        let output = self
            .base_command()
            .args([
                "--extract-audio",
                "--audio-format",
                &self.audio_format,
                "--audio-quality",
                "0",
                "--output",
            ])
            .arg(dest)
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "audio download failed for {}: {}",
                url,
                stderr.trim()
            ));
        }

        Ok(())
    }
}
