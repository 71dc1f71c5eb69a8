/// Lofi Catalog Builder
///
/// Sequential pipeline that turns a playlist of video references into a
/// mood-tagged JSON catalog with locally stored thumbnail and audio assets.

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod ids;
pub mod mood;
pub mod pipeline;
pub mod playlist;
pub mod processor;

// Re-export main types for easy access
pub use crate::catalog::{Catalog, CatalogEntry, CatalogStore, MoodWallpaper};
pub use crate::config::{Config, PipelineOptions};
pub use crate::fetch::{
    AssetStore, MediaMetadata, MediaResolver, WallhavenClient, WallpaperSearcher, YtDlpResolver,
};
pub use crate::ids::{IdAllocator, IdError};
pub use crate::mood::{classify, Mood};
pub use crate::pipeline::{PipelineDriver, RunStats};
pub use crate::playlist::PlaylistItem;
pub use crate::processor::{ItemOutcome, ItemProcessor};
