use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// One input item, normalized from either playlist shape.
#[derive(Debug, Clone)]
pub struct PlaylistItem {
    /// Source URL as written in the playlist file.
    pub url: String,

    /// Human-readable duration label, when the playlist carries one.
    pub duration: Option<String>,

    /// Duration in seconds, when the playlist carries one.
    pub seconds: Option<f64>,
}

/// Playlists mix plain URL strings with small descriptor objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Url(String),
    Descriptor {
        url: String,
        #[serde(default)]
        duration: Option<String>,
        #[serde(default)]
        seconds: Option<f64>,
    },
}

impl From<RawItem> for PlaylistItem {
    fn from(raw: RawItem) -> Self {
        match raw {
            RawItem::Url(url) => PlaylistItem {
                url,
                duration: None,
                seconds: None,
            },
            RawItem::Descriptor {
                url,
                duration,
                seconds,
            } => PlaylistItem {
                url,
                duration,
                seconds,
            },
        }
    }
}

/// Load the playlist file.
///
/// A missing file, unparsable content, or a non-array top level is fatal:
/// there is nothing to process, so the error propagates to the process
/// boundary.
pub async fn load(path: &Path) -> Result<Vec<PlaylistItem>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read playlist file {}", path.display()))?;

    let raw: Vec<RawItem> = serde_json::from_str(&content)
        .with_context(|| format!("playlist file {} is not a JSON array of items", path.display()))?;

    let items: Vec<PlaylistItem> = raw.into_iter().map(PlaylistItem::from).collect();
    info!("📃 Loaded {} playlist items from {}", items.len(), path.display());
    Ok(items)
}
