use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the catalog builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline behaviour toggles
    pub pipeline: PipelineOptions,

    /// Catalog and asset storage layout
    pub storage: StorageConfig,

    /// External fetch collaborator settings
    pub fetch: FetchConfig,
}

/// Optional steps the item processor performs per entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Download the thumbnail image for every entry
    pub fetch_thumbnail: bool,

    /// Download the audio track for every entry
    pub fetch_audio: bool,

    /// Fetch a representative wallpaper the first time a mood is seen
    pub fetch_wallpaper: bool,

    /// Fixed pause between items in milliseconds (0 disables pacing)
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the catalog files and asset subdirectories
    pub output_dir: PathBuf,

    /// Catalog entry list (JSON array)
    pub catalog_file: String,

    /// Derived mood -> entry ids map
    pub mood_index_file: String,

    /// Mood -> wallpaper metadata map
    pub wallpapers_file: String,

    /// Subdirectory for thumbnails and wallpapers
    pub images_dir: String,

    /// Subdirectory for audio tracks
    pub audio_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// External downloader binary
    pub ytdlp_bin: String,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,

    /// `--add-header` overrides passed to the downloader
    pub extra_headers: Vec<String>,

    /// Audio container format requested from the downloader
    pub audio_format: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "lofi-catalog.toml",
            "config/lofi-catalog.toml",
            "~/.config/lofi-catalog/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(output_dir) = std::env::var("LOFI_CATALOG_OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(delay) = std::env::var("LOFI_CATALOG_DELAY_MS") {
            if let Ok(delay) = delay.parse() {
                self.pipeline.delay_ms = delay;
            }
        }

        if let Ok(bin) = std::env::var("LOFI_CATALOG_YTDLP") {
            self.fetch.ytdlp_bin = bin;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.ytdlp_bin.is_empty() {
            return Err(anyhow!("ytdlp_bin must not be empty"));
        }

        if self.fetch.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        for name in [
            &self.storage.catalog_file,
            &self.storage.mood_index_file,
            &self.storage.wallpapers_file,
            &self.storage.images_dir,
            &self.storage.audio_dir,
        ] {
            if name.is_empty() {
                return Err(anyhow!("storage file and directory names must not be empty"));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineOptions {
                fetch_thumbnail: true,
                fetch_audio: true,
                fetch_wallpaper: true,
                delay_ms: 1000,
            },
            storage: StorageConfig {
                output_dir: PathBuf::from("."),
                catalog_file: "catalog.json".to_string(),
                mood_index_file: "moods.json".to_string(),
                wallpapers_file: "mood_wallpapers.json".to_string(),
                images_dir: "images".to_string(),
                audio_dir: "mp3".to_string(),
            },
            fetch: FetchConfig {
                ytdlp_bin: "yt-dlp".to_string(),
                request_timeout_seconds: 30,
                extra_headers: vec![
                    "referer:youtube.com".to_string(),
                    "user-agent:googlebot".to_string(),
                ],
                audio_format: "mp3".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.pipeline.fetch_thumbnail);
        assert_eq!(config.pipeline.delay_ms, 1000);
        assert_eq!(config.fetch.ytdlp_bin, "yt-dlp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.storage.catalog_file, "catalog.json");
        assert_eq!(parsed.fetch.extra_headers.len(), 2);
    }

    #[test]
    fn test_validation_rejects_empty_binary() {
        let mut config = Config::default();
        config.fetch.ytdlp_bin.clear();
        assert!(config.validate().is_err());
    }
}
