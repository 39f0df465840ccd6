//! Configuration management for cinedex
//!
//! Handles config file loading/saving and TMDB credential resolution.
//! Config is stored at ~/.config/cinedex/config.toml

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::ResolverOptions;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Largest accepted release window, in days
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TMDB v3 API key or v4 read access token
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    /// ISO 3166-1 region used for release-date based listings
    pub region: Option<String>,
    pub timeout_secs: u64,
    pub now_playing_days: u32,
    pub upcoming_days: u32,
    pub min_votes_for_rating: u32,
    /// Override for the local store file
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let resolver = ResolverOptions::default();
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: "en-US".to_string(),
            region: None,
            timeout_secs: 10,
            now_playing_days: resolver.now_playing_days,
            upcoming_days: resolver.upcoming_days,
            min_votes_for_rating: resolver.min_votes_for_rating,
            store_path: None,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/cinedex/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinedex").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce empty windows or requests
    pub fn validate(&self) -> Result<()> {
        if self.now_playing_days > MAX_WINDOW_DAYS {
            bail!(
                "now_playing_days must be at most {}, got {}",
                MAX_WINDOW_DAYS,
                self.now_playing_days
            );
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.upcoming_days) {
            bail!(
                "upcoming_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS,
                self.upcoming_days
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Apply environment overrides:
    /// 1. TMDB_ACCESS_TOKEN / TMDB_API_KEY replace the credential
    /// 2. TMDB_BASE_URL replaces the API base URL
    pub fn with_env(mut self) -> Self {
        if let Some(key) = env_var("TMDB_ACCESS_TOKEN").or_else(|| env_var("TMDB_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = env_var("TMDB_BASE_URL") {
            self.base_url = url;
        }
        self
    }

    /// Credential to authenticate with, or an error explaining how to set one
    pub fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No TMDB credential configured. Set TMDB_API_KEY or api_key in {}",
                    Self::path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "config.toml".into())
                )
            })
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            now_playing_days: self.now_playing_days,
            upcoming_days: self.upcoming_days,
            min_votes_for_rating: self.min_votes_for_rating,
            region: self.region.clone(),
        }
    }

    /// Store file location (~/.local/share/cinedex/store.json unless overridden)
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("cinedex").join("store.json")))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
