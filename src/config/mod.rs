//! Configuration management for webby-reader

pub mod bookmarks;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub use bookmarks::BookmarkFile;

/// Text scale used when none is configured
pub const DEFAULT_TEXT_SCALE: f64 = 1.0;
/// Smallest allowed text scale
pub const MIN_TEXT_SCALE: f64 = 0.5;
/// Largest allowed text scale
pub const MAX_TEXT_SCALE: f64 = 2.0;
/// Text scale change per key press
pub const TEXT_SCALE_STEP: f64 = 0.1;
/// Text is never wrapped narrower than this
pub const MIN_WRAP_WIDTH: usize = 20;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the webby server
    pub server_url: String,

    /// Bearer token for the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User the token belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Reader text scale (1.0 = normal)
    pub text_scale: f64,

    /// Selected theme name
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            username: None,
            text_scale: DEFAULT_TEXT_SCALE,
            theme: "dark".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "webby-reader").context("Failed to determine config directory")
    }

    /// Configured text scale, or the default when out of range
    pub fn text_scale(&self) -> f64 {
        if (MIN_TEXT_SCALE..=MAX_TEXT_SCALE).contains(&self.text_scale) {
            self.text_scale
        } else {
            DEFAULT_TEXT_SCALE
        }
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
