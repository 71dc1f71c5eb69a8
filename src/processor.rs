use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{canonicalize_source, AssetPaths, Catalog, CatalogEntry, MoodWallpaper};
use crate::config::PipelineOptions;
use crate::fetch::{AssetStore, MediaResolver, WallpaperSearcher};
use crate::ids::IdAllocator;
use crate::mood::{classify, Mood};
use crate::playlist::PlaylistItem;

/// Result of processing one input item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// A new entry was appended to the catalog.
    Saved(CatalogEntry),

    /// The item's source already exists in the catalog.
    Skipped,
}

/// Orchestrates the processing of a single playlist item: dedup check,
/// metadata fetch, id allocation, asset fetches, mood classification and
/// catalog append.
///
/// Persistence is the driver's responsibility; this component only mutates
/// the in-memory catalog.
pub struct ItemProcessor {
    options: PipelineOptions,
    resolver: Arc<dyn MediaResolver>,
    wallpaper_searcher: Arc<dyn WallpaperSearcher>,
    assets: AssetStore,
}

impl ItemProcessor {
    pub fn new(
        options: PipelineOptions,
        resolver: Arc<dyn MediaResolver>,
        wallpaper_searcher: Arc<dyn WallpaperSearcher>,
        assets: AssetStore,
    ) -> Self {
        Self {
            options,
            resolver,
            wallpaper_searcher,
            assets,
        }
    }

    /// Create the asset directories before the first item runs.
    pub async fn prepare(&self) -> Result<()> {
        self.assets.ensure_dirs().await
    }

    /// Process one item against the in-memory catalog.
    ///
    /// A metadata-fetch failure or id exhaustion aborts this item only and
    /// surfaces as `Err`; asset failures are logged and the entry is still
    /// recorded.
    pub async fn process(
        &self,
        item: &PlaylistItem,
        catalog: &mut Catalog,
        ids: &mut IdAllocator,
    ) -> Result<ItemOutcome> {
        let source = canonicalize_source(&item.url);

        if catalog.contains_source(&source) {
            return Ok(ItemOutcome::Skipped);
        }

        let metadata = self
            .resolver
            .resolve_metadata(&item.url)
            .await
            .with_context(|| format!("metadata fetch failed for {}", item.url))?;

        let id = ids.allocate()?;

        let mut assets = AssetPaths::default();

        if self.options.fetch_thumbnail {
            if let Some(ref thumbnail_url) = metadata.thumbnail_url {
                let rel = self.assets.thumbnail_rel(&id);
                match self.assets.download_image(thumbnail_url, &rel).await {
                    Ok(()) => assets.thumbnail = Some(rel),
                    Err(e) => warn!("Thumbnail download failed for {}: {}", id, e),
                }
            } else {
                debug!("No thumbnail reference in metadata for {}", item.url);
            }
        }

        if self.options.fetch_audio {
            let rel = self.assets.audio_rel(&id);
            match self
                .resolver
                .download_audio(&item.url, &self.assets.absolute(&rel))
                .await
            {
                Ok(()) => assets.audio = Some(rel),
                Err(e) => warn!("Audio download failed for {}: {}", id, e),
            }
        }

        let mood = classify(metadata.title.as_deref().unwrap_or(""));
        let entry = CatalogEntry {
            id,
            title: metadata.title,
            description: metadata.description,
            source,
            assets,
            duration_seconds: metadata.duration_seconds.or(item.seconds),
            mood,
            created_at: Utc::now(),
        };

        catalog.push_entry(entry.clone());

        if self.options.fetch_wallpaper && catalog.wallpaper_for(mood).is_none() {
            self.claim_mood_wallpaper(mood, catalog).await;
        }

        Ok(ItemOutcome::Saved(entry))
    }

    /// Best-effort wallpaper fetch for a mood's first occurrence.
    ///
    /// The mood claims its slot after the first attempt even when the search
    /// comes back empty or fails, so later entries never re-trigger it; an
    /// already-downloaded wallpaper file is reused without re-fetching.
    async fn claim_mood_wallpaper(&self, mood: Mood, catalog: &mut Catalog) {
        let rel = self.assets.wallpaper_rel(mood);
        let mut wallpaper_source = None;

        if !self.assets.absolute(&rel).exists() {
            match self.wallpaper_searcher.search(mood.as_str()).await {
                Ok(candidates) => {
                    if let Some(url) = candidates.into_iter().next() {
                        match self.assets.download_image(&url, &rel).await {
                            Ok(()) => wallpaper_source = Some(url),
                            Err(e) => warn!("Wallpaper download failed for mood {}: {}", mood, e),
                        }
                    } else {
                        debug!("No wallpaper candidates for mood {}", mood);
                    }
                }
                Err(e) => warn!("Wallpaper search failed for mood {}: {}", mood, e),
            }
        }

        catalog.claim_wallpaper(MoodWallpaper {
            mood,
            wallpaper: rel,
            wallpaper_source,
            description: format!("Wallpaper for mood '{}' fetched from Wallhaven.", mood),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::MediaMetadata;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct CannedResolver {
        fail: bool,
    }

    #[async_trait]
    impl MediaResolver for CannedResolver {
        async fn resolve_metadata(&self, url: &str) -> Result<MediaMetadata> {
            if self.fail {
                return Err(anyhow!("simulated metadata failure"));
            }
            Ok(MediaMetadata {
                title: Some(format!("rainy mix from {}", url)),
                description: Some("a mix".to_string()),
                thumbnail_url: None,
                duration_seconds: Some(60.0),
            })
        }

        async fn download_audio(&self, _url: &str, dest: &Path) -> Result<()> {
            tokio::fs::write(dest, b"audio").await?;
            Ok(())
        }
    }

    struct NoWallpapers;

    #[async_trait]
    impl WallpaperSearcher for NoWallpapers {
        async fn search(&self, _query: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn processor_in(dir: &TempDir, fail: bool) -> ItemProcessor {
        let config = Config::default();
        let mut storage = config.storage.clone();
        storage.output_dir = dir.path().to_path_buf();
        ItemProcessor::new(
            config.pipeline.clone(),
            Arc::new(CannedResolver { fail }),
            Arc::new(NoWallpapers),
            AssetStore::new(&storage, &config.fetch),
        )
    }

    fn item(url: &str) -> PlaylistItem {
        PlaylistItem {
            url: url.to_string(),
            duration: None,
            seconds: None,
        }
    }

    #[tokio::test]
    async fn test_saved_entry_carries_metadata_and_mood() {
        let dir = TempDir::new().unwrap();
        let processor = processor_in(&dir, false);
        processor.prepare().await.unwrap();

        let mut catalog = Catalog::default();
        let mut ids = IdAllocator::default();
        let outcome = processor
            .process(&item("https://youtu.be/jfKfPfyJRdk"), &mut catalog, &mut ids)
            .await
            .unwrap();

        match outcome {
            ItemOutcome::Saved(entry) => {
                assert_eq!(entry.mood, Mood::Rainy);
                assert_eq!(entry.source, "https://www.youtube.com/watch?v=jfKfPfyJRdk");
                assert_eq!(entry.duration_seconds, Some(60.0));
                assert!(entry.assets.audio.is_some());
            }
            ItemOutcome::Skipped => panic!("expected a saved entry"),
        }
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_known_source_is_skipped_without_consuming_an_id() {
        let dir = TempDir::new().unwrap();
        let processor = processor_in(&dir, false);
        processor.prepare().await.unwrap();

        let mut catalog = Catalog::default();
        let mut ids = IdAllocator::default();
        processor
            .process(&item("https://youtu.be/jfKfPfyJRdk"), &mut catalog, &mut ids)
            .await
            .unwrap();

        // Same video, spelled as a watch link this time.
        let outcome = processor
            .process(
                &item("https://www.youtube.com/watch?v=jfKfPfyJRdk"),
                &mut catalog,
                &mut ids,
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ItemOutcome::Skipped));
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_failure_aborts_only_this_item() {
        let dir = TempDir::new().unwrap();
        let processor = processor_in(&dir, true);
        processor.prepare().await.unwrap();

        let mut catalog = Catalog::default();
        let mut ids = IdAllocator::default();
        let result = processor
            .process(&item("https://youtu.be/jfKfPfyJRdk"), &mut catalog, &mut ids)
            .await;

        assert!(result.is_err());
        assert!(catalog.entries.is_empty());
    }

    #[tokio::test]
    async fn test_wallpaper_claimed_once_even_without_candidates() {
        let dir = TempDir::new().unwrap();
        let processor = processor_in(&dir, false);
        processor.prepare().await.unwrap();

        let mut catalog = Catalog::default();
        let mut ids = IdAllocator::default();
        processor
            .process(&item("https://youtu.be/aaaaaaaaaaa"), &mut catalog, &mut ids)
            .await
            .unwrap();

        let claim = catalog.wallpaper_for(Mood::Rainy).unwrap();
        assert!(claim.wallpaper_source.is_none());
        assert_eq!(claim.wallpaper, std::path::PathBuf::from("images/mood_rainy.jpg"));
    }
}
