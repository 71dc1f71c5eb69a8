use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::mood::Mood;

/// Relative storage paths of the binary assets attached to an entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssetPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
}

/// One processed media item.
///
/// Created exactly once when its source is first successfully processed;
/// never updated in place. The `id` is unique for the catalog's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,

    /// Canonical source reference, used for idempotent dedup.
    pub source: String,

    #[serde(default)]
    pub assets: AssetPaths,

    pub duration_seconds: Option<f64>,
    pub mood: Mood,
    pub created_at: DateTime<Utc>,
}

/// Representative wallpaper claimed by a mood, at most once per catalog
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodWallpaper {
    pub mood: Mood,
    pub wallpaper: PathBuf,
    pub wallpaper_source: Option<String>,
    pub description: String,
}

/// Derived mood -> entry ids map; rebuilt from the entry list on load,
/// never independently authoritative.
pub type MoodIndex = BTreeMap<Mood, Vec<String>>;

pub type MoodWallpapers = BTreeMap<Mood, MoodWallpaper>;

/// The full in-memory catalog: entry list plus derived indices.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub mood_index: MoodIndex,
    pub wallpapers: MoodWallpapers,
}

impl Catalog {
    /// Rebuild the mood index from the entry list.
    pub fn rebuild_mood_index(&mut self) {
        self.mood_index.clear();
        for entry in &self.entries {
            self.mood_index
                .entry(entry.mood)
                .or_default()
                .push(entry.id.clone());
        }
    }

    /// Membership test for resume/dedup against canonical sources.
    pub fn contains_source(&self, source: &str) -> bool {
        self.entries.iter().any(|entry| entry.source == source)
    }

    /// All ids currently present, used to seed the id allocator.
    pub fn id_set(&self) -> HashSet<String> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    /// Append an entry and register it under its mood.
    pub fn push_entry(&mut self, entry: CatalogEntry) {
        self.mood_index
            .entry(entry.mood)
            .or_default()
            .push(entry.id.clone());
        self.entries.push(entry);
    }

    pub fn wallpaper_for(&self, mood: Mood) -> Option<&MoodWallpaper> {
        self.wallpapers.get(&mood)
    }

    /// Record a mood's wallpaper claim. First claim wins.
    pub fn claim_wallpaper(&mut self, wallpaper: MoodWallpaper) {
        self.wallpapers.entry(wallpaper.mood).or_insert(wallpaper);
    }
}

static VIDEO_ID_RE: OnceLock<Regex> = OnceLock::new();

fn video_id_re() -> &'static Regex {
    VIDEO_ID_RE.get_or_init(|| {
        Regex::new(r"(?:[?&]v=|youtu\.be/)([a-zA-Z0-9_-]{11})").expect("valid video id pattern")
    })
}

/// Normalize a raw input reference to the one canonical `source` form.
///
/// YouTube watch and short links collapse to a plain watch URL so the same
/// video never dedups differently depending on how the playlist spelled it;
/// anything else is used trimmed as-is.
pub fn canonicalize_source(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(captures) = video_id_re().captures(trimmed) {
        return format!("https://www.youtube.com/watch?v={}", &captures[1]);
    }
    trimmed.to_string()
}

/// Loads and saves the persisted catalog files.
///
/// Load is tolerant: missing or corrupt files yield an empty catalog rather
/// than failing the process. Save fully rewrites all three files and is
/// invoked by the driver after every item for crash-safe checkpointing.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog_path: PathBuf,
    mood_index_path: PathBuf,
    wallpapers_path: PathBuf,
}

impl CatalogStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            catalog_path: storage.output_dir.join(&storage.catalog_file),
            mood_index_path: storage.output_dir.join(&storage.mood_index_file),
            wallpapers_path: storage.output_dir.join(&storage.wallpapers_file),
        }
    }

    /// Load the persisted catalog, recovering from missing or corrupt state.
    pub async fn load(&self) -> Catalog {
        let mut catalog = Catalog {
            entries: self.load_entries().await,
            mood_index: MoodIndex::new(),
            wallpapers: self.load_wallpapers().await,
        };
        catalog.rebuild_mood_index();
        debug!(
            "📚 Loaded catalog: {} entries, {} moods, {} wallpapers",
            catalog.entries.len(),
            catalog.mood_index.len(),
            catalog.wallpapers.len()
        );
        catalog
    }

    async fn load_entries(&self) -> Vec<CatalogEntry> {
        let content = match fs::read_to_string(&self.catalog_path).await {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Catalog file {} is not valid JSON, starting fresh: {}",
                    self.catalog_path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let items = match value {
            serde_json::Value::Array(items) => items,
            _ => {
                warn!(
                    "Catalog file {} is not a JSON array, starting fresh",
                    self.catalog_path.display()
                );
                return Vec::new();
            }
        };

        // Malformed entries are dropped individually so one bad record does
        // not discard the rest of the catalog.
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<CatalogEntry>(item) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping malformed catalog entry: {}", e),
            }
        }
        entries
    }

    async fn load_wallpapers(&self) -> MoodWallpapers {
        let content = match fs::read_to_string(&self.wallpapers_path).await {
            Ok(content) => content,
            Err(_) => return MoodWallpapers::new(),
        };

        match serde_json::from_str(&content) {
            Ok(wallpapers) => wallpapers,
            Err(e) => {
                warn!(
                    "Wallpaper file {} unreadable, starting fresh: {}",
                    self.wallpapers_path.display(),
                    e
                );
                MoodWallpapers::new()
            }
        }
    }

    /// Persist the full catalog: entries, derived mood index, wallpapers.
    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.catalog_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let entries_json = serde_json::to_string_pretty(&catalog.entries)?;
        fs::write(&self.catalog_path, entries_json).await?;

        let index_json = serde_json::to_string_pretty(&catalog.mood_index)?;
        fs::write(&self.mood_index_path, index_json).await?;

        let wallpapers_json = serde_json::to_string_pretty(&catalog.wallpapers)?;
        fs::write(&self.wallpapers_path, wallpapers_json).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> StorageConfig {
        let mut storage = Config::default().storage;
        storage.output_dir = dir.path().to_path_buf();
        storage
    }

    fn sample_entry(id: &str, source: &str, mood: Mood) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            title: Some("Rainy night".to_string()),
            description: None,
            source: source.to_string(),
            assets: AssetPaths::default(),
            duration_seconds: Some(120.0),
            mood,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_canonicalize_watch_and_short_links() {
        let canonical = "https://www.youtube.com/watch?v=jfKfPfyJRdk";
        assert_eq!(canonicalize_source("https://www.youtube.com/watch?v=jfKfPfyJRdk"), canonical);
        assert_eq!(canonicalize_source("https://youtu.be/jfKfPfyJRdk"), canonical);
        assert_eq!(
            canonicalize_source("https://www.youtube.com/watch?list=PL123&v=jfKfPfyJRdk"),
            canonical
        );
    }

    #[test]
    fn test_canonicalize_leaves_other_sources_trimmed() {
        assert_eq!(
            canonicalize_source("  https://example.com/stream.m3u8 "),
            "https://example.com/stream.m3u8"
        );
    }

    #[test]
    fn test_push_entry_updates_mood_index() {
        let mut catalog = Catalog::default();
        catalog.push_entry(sample_entry("10001", "a", Mood::Rainy));
        catalog.push_entry(sample_entry("10002", "b", Mood::Rainy));
        assert_eq!(catalog.mood_index[&Mood::Rainy], vec!["10001", "10002"]);
        assert!(catalog.contains_source("a"));
        assert!(!catalog.contains_source("c"));
    }

    #[test]
    fn test_first_wallpaper_claim_wins() {
        let mut catalog = Catalog::default();
        catalog.claim_wallpaper(MoodWallpaper {
            mood: Mood::Chill,
            wallpaper: PathBuf::from("images/mood_chill.jpg"),
            wallpaper_source: Some("https://example.com/a.jpg".to_string()),
            description: "first".to_string(),
        });
        catalog.claim_wallpaper(MoodWallpaper {
            mood: Mood::Chill,
            wallpaper: PathBuf::from("images/other.jpg"),
            wallpaper_source: None,
            description: "second".to_string(),
        });
        assert_eq!(catalog.wallpaper_for(Mood::Chill).unwrap().description, "first");
    }

    #[tokio::test]
    async fn test_missing_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(&storage_in(&dir));
        let catalog = store.load().await;
        assert!(catalog.entries.is_empty());
        assert!(catalog.wallpapers.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_catalog_recovers_empty() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        tokio::fs::write(dir.path().join(&storage.catalog_file), "not json {{{")
            .await
            .unwrap();
        let store = CatalogStore::new(&storage);
        assert!(store.load().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_non_array_catalog_recovers_empty() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        tokio::fs::write(dir.path().join(&storage.catalog_file), r#"{"entries": []}"#)
            .await
            .unwrap();
        let store = CatalogStore::new(&storage);
        assert!(store.load().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entry_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        let store = CatalogStore::new(&storage);

        let mut catalog = Catalog::default();
        catalog.push_entry(sample_entry("10001", "a", Mood::Sleep));
        store.save(&catalog).await.unwrap();

        // Append a bogus record next to the valid one.
        let raw = tokio::fs::read_to_string(dir.path().join(&storage.catalog_file))
            .await
            .unwrap();
        let mut items: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        items.push(serde_json::json!({"id": 42}));
        tokio::fs::write(
            dir.path().join(&storage.catalog_file),
            serde_json::to_string_pretty(&items).unwrap(),
        )
        .await
        .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].id, "10001");
    }

    #[tokio::test]
    async fn test_save_load_round_trip_rebuilds_index() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(&storage_in(&dir));

        let mut catalog = Catalog::default();
        catalog.push_entry(sample_entry("10001", "a", Mood::Jazzy));
        catalog.push_entry(sample_entry("10002", "b", Mood::Lofi));
        catalog.claim_wallpaper(MoodWallpaper {
            mood: Mood::Jazzy,
            wallpaper: PathBuf::from("images/mood_jazzy.jpg"),
            wallpaper_source: None,
            description: "Wallpaper for mood 'jazzy' fetched from Wallhaven.".to_string(),
        });
        store.save(&catalog).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.mood_index[&Mood::Jazzy], vec!["10001"]);
        assert_eq!(loaded.mood_index[&Mood::Lofi], vec!["10002"]);
        assert!(loaded.wallpaper_for(Mood::Jazzy).is_some());
    }
}
