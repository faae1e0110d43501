//! Application configuration with persistence
//!
//! Configuration is read from `~/.config/edufun/config.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings for the console application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// EduFun server base URL. Without one the app runs on in-memory backends.
    pub server_url: Option<String>,
    /// Background music track. Without one (or if it fails to load) music is silent.
    pub music_track: Option<PathBuf>,
    /// Per-request timeout; unset means requests wait as long as the server takes
    pub request_timeout_secs: Option<u64>,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            music_track: None,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("edufun"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load configuration from the default location. A missing file is
    /// created with the defaults so it can be edited.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(&path) {
                warn!("Failed to write default config: {}", e);
            }
            return config;
        }
        Self::load_from(&path)
    }

    /// Load configuration from `path`, or defaults if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
