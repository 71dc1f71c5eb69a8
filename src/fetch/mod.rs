use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod assets;
pub mod wallhaven;
pub mod ytdlp;

pub use assets::AssetStore;
pub use wallhaven::WallhavenClient;
pub use ytdlp::YtDlpResolver;

/// Metadata returned by the external downloader for one source reference.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<f64>,
}

/// External metadata/download collaborator.
///
/// The trait seam lets tests inject failing or canned implementations; the
/// production implementation shells out to yt-dlp.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Fetch remote metadata for a source URL. May fail on any malformed or
    /// restricted input; the failure is contained to the item being processed.
    async fn resolve_metadata(&self, url: &str) -> Result<MediaMetadata>;

    /// Download the audio track for a source URL to `dest`.
    async fn download_audio(&self, url: &str, dest: &Path) -> Result<()>;
}

/// External wallpaper search collaborator.
#[async_trait]
pub trait WallpaperSearcher: Send + Sync {
    /// Return candidate image URLs for a keyword query, best match first.
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}
