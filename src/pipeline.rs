use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::fetch::{AssetStore, MediaResolver, WallpaperSearcher};
use crate::ids::IdAllocator;
use crate::playlist;
use crate::processor::{ItemOutcome, ItemProcessor};

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives the catalog build: loads the input list and the persisted catalog,
/// processes items strictly sequentially, and flushes the full catalog to
/// disk after every item so an interrupted run loses at most the in-flight
/// item.
///
/// Per-item errors are logged and contained; only a playlist load failure
/// propagates to the process boundary.
pub struct PipelineDriver {
    config: Config,
    store: CatalogStore,
    processor: ItemProcessor,
}

impl PipelineDriver {
    pub fn new(
        config: Config,
        resolver: Arc<dyn MediaResolver>,
        wallpaper_searcher: Arc<dyn WallpaperSearcher>,
    ) -> Self {
        let store = CatalogStore::new(&config.storage);
        let assets = AssetStore::new(&config.storage, &config.fetch);
        let processor = ItemProcessor::new(
            config.pipeline.clone(),
            resolver,
            wallpaper_searcher,
            assets,
        );

        Self {
            config,
            store,
            processor,
        }
    }

    pub async fn run(&self, playlist_path: &Path) -> Result<RunStats> {
        // Loading: the playlist is the only fatal input.
        let items = playlist::load(playlist_path).await?;
        let total = items.len();

        let mut catalog = self.store.load().await;
        let mut ids = IdAllocator::from_ids(catalog.id_set());
        info!(
            "📚 Catalog holds {} entries across {} moods",
            catalog.entries.len(),
            catalog.mood_index.len()
        );

        self.processor.prepare().await?;

        let mut stats = RunStats {
            total,
            ..RunStats::default()
        };

        for (index, item) in items.iter().enumerate() {
            // Pacing between external requests; a scheduling knob, not a
            // correctness requirement.
            if index > 0 && self.config.pipeline.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.pipeline.delay_ms)).await;
            }

            match self.processor.process(item, &mut catalog, &mut ids).await {
                Ok(ItemOutcome::Saved(entry)) => {
                    stats.saved += 1;
                    info!(
                        "[{}/{}] Saved: {} [{}]",
                        index + 1,
                        total,
                        entry.title.as_deref().unwrap_or(&entry.source),
                        entry.mood
                    );
                }
                Ok(ItemOutcome::Skipped) => {
                    stats.skipped += 1;
                    info!(
                        "[{}/{}] Skipping (already exists): {}",
                        index + 1,
                        total,
                        item.url
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("[{}/{}] Error: {}: {:#}", index + 1, total, item.url, e);
                }
            }

            // Checkpoint after every item, not only at the end.
            self.store.save(&catalog).await?;
            info!(
                "Progress: {}/{} items processed, {} remaining",
                index + 1,
                total,
                total - (index + 1)
            );
        }

        // Final flush, identical to the per-item persistence.
        self.store.save(&catalog).await?;
        info!(
            "🎉 Run complete: {} saved, {} skipped, {} failed of {} items",
            stats.saved, stats.skipped, stats.failed, stats.total
        );

        Ok(stats)
    }
}
