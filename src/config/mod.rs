use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transcript::FormatOptions;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider access settings
    pub youtube: YoutubeConfig,

    /// Default transcript formatting
    pub formatting: FormatOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// yt-dlp executable name or path
    pub yt_dlp_path: String,

    /// Caption language used when none is requested
    pub default_language: Option<String>,

    /// User agent sent when fetching caption tracks
    pub user_agent: String,

    /// Accept-Language header sent when fetching caption tracks
    pub accept_language: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            default_language: Some("en".to_string()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when none exists
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location, returning the path written
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("youtube-transcript").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.youtube.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("youtube.yt_dlp_path must not be empty");
        }

        let threshold = self.formatting.time_gap_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            anyhow::bail!(
                "formatting.time_gap_threshold must be a non-negative number, got {}",
                threshold
            );
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  yt-dlp: {}", self.youtube.yt_dlp_path);
        println!(
            "  Default Language: {}",
            self.youtube.default_language.as_deref().unwrap_or("(video default)")
        );
        println!("  Paragraphs: {}", self.formatting.enable_paragraphs);
        println!("  Time Gap Threshold: {}s", self.formatting.time_gap_threshold);
        println!(
            "  Max Fragments Per Paragraph: {}",
            self.formatting.max_fragments_per_paragraph
        );
    }
}
