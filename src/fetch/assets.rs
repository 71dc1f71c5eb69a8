use anyhow::{anyhow, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::config::{FetchConfig, StorageConfig};
use crate::mood::Mood;

/// Owns the asset storage directories and downloads image assets into them.
///
/// Catalog entries keep paths relative to the output root so the catalog
/// stays portable; this store resolves them to absolute paths on write.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    images_dir: String,
    audio_dir: String,
    audio_ext: String,
    client: Client,
}

impl AssetStore {
    pub fn new(storage: &StorageConfig, fetch: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.request_timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            root: storage.output_dir.clone(),
            images_dir: storage.images_dir.clone(),
            audio_dir: storage.audio_dir.clone(),
            audio_ext: fetch.audio_format.clone(),
            client,
        }
    }

    /// Create the asset directories if absent.
    pub async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(&self.images_dir)).await?;
        fs::create_dir_all(self.root.join(&self.audio_dir)).await?;
        Ok(())
    }

    pub fn thumbnail_rel(&self, id: &str) -> PathBuf {
        PathBuf::from(&self.images_dir).join(format!("{}.jpg", id))
    }

    pub fn audio_rel(&self, id: &str) -> PathBuf {
        PathBuf::from(&self.audio_dir).join(format!("{}.{}", id, self.audio_ext))
    }

    pub fn wallpaper_rel(&self, mood: Mood) -> PathBuf {
        PathBuf::from(&self.images_dir).join(format!("mood_{}.jpg", mood))
    }

    pub fn absolute(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    /// Download an image over HTTP into the given relative path.
    ///
    /// An already-present file is reused without re-fetching.
    pub async fn download_image(&self, url: &str, rel: &Path) -> Result<()> {
        let dest = self.absolute(rel);
        if dest.exists() {
            debug!("Image already present, skipping download: {}", dest.display());
            return Ok(());
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "image request for {} failed with status {}",
                url,
                response.status()
            ));
        }

        let bytes = response.bytes().await?;
        fs::write(&dest, &bytes).await?;
        debug!("Saved image: {}", dest.display());
        Ok(())
    }
}
