//! Local audio preferences with persistence
//!
//! Preferences are saved to `~/.config/edufun/preferences.toml` as a flat
//! table of string values, one per key.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use edufun_audio::{clamp_volume, AudioPreference};
use tracing::{info, warn};

/// Key of the background music volume (`0.0`–`1.0`).
pub const MUSIC_VOLUME_KEY: &str = "edu_music_volume";
/// Key of the sound effects volume (`0.0`–`1.0`).
pub const SOUND_VOLUME_KEY: &str = "edu_sound_volume";
/// Key of the music enabled flag (`"true"`/`"false"`).
pub const MUSIC_ENABLED_KEY: &str = "edu_music_enabled";

/// Durable string key-value storage. Write failures are logged, never returned.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Preferences kept only for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Preferences stored in a TOML file, rewritten on every change
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Get the default preferences file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("edufun").join("preferences.toml"))
    }

    /// Open the store at `path`, starting empty if the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read_values(&path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            info!("No preferences file found, using defaults");
            return BTreeMap::new();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(values) => {
                    info!("Loaded preferences from {:?}", path);
                    values
                }
                Err(e) => {
                    warn!("Failed to parse preferences: {}, using defaults", e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                warn!("Failed to read preferences file: {}, using defaults", e);
                BTreeMap::new()
            }
        }
    }

    fn write_values(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_values() {
            warn!("Failed to save preferences to {:?}: {}", self.path, e);
        }
    }
}

/// Read the audio preference, writing defaults back for missing keys.
///
/// Unparseable values fall back to the default and out-of-range volumes are
/// clamped.
pub fn load_audio_preference(store: &mut impl PreferenceStore) -> AudioPreference {
    let defaults = AudioPreference::default();

    let music_volume = read_volume(store, MUSIC_VOLUME_KEY, defaults.music_volume);
    let sound_volume = read_volume(store, SOUND_VOLUME_KEY, defaults.sound_volume);
    let music_enabled = match store.get(MUSIC_ENABLED_KEY) {
        Some(value) => value.trim() != "false",
        None => {
            store.set(MUSIC_ENABLED_KEY, &defaults.music_enabled.to_string());
            defaults.music_enabled
        }
    };

    AudioPreference {
        music_volume,
        sound_volume,
        music_enabled,
    }
}

fn read_volume(store: &mut impl PreferenceStore, key: &str, default: f64) -> f64 {
    match store.get(key) {
        Some(value) => match value.trim().parse::<f64>() {
            Ok(volume) => clamp_volume(volume),
            Err(_) => {
                warn!("Ignoring invalid {} value {:?}", key, value);
                default
            }
        },
        None => {
            store.set(key, &default.to_string());
            default
        }
    }
}

/// Persist all three audio keys.
pub fn save_audio_preference(store: &mut impl PreferenceStore, pref: &AudioPreference) {
    let pref = pref.clamped();
    store.set(MUSIC_VOLUME_KEY, &pref.music_volume.to_string());
    store.set(SOUND_VOLUME_KEY, &pref.sound_volume.to_string());
    store.set(MUSIC_ENABLED_KEY, &pref.music_enabled.to_string());
}
