//! Configuration management for Morsecast

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::sequencer::Timing;
use crate::transform::TransformParams;
use crate::types::TransformMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub defaults: DefaultsConfig,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub dit_ms: u64,
    pub dah_ms: u64,
    pub pulse_gap_ms: u64,
    pub char_gap_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// `bell` or `silent`
    pub driver: String,
    pub normal_hz: u32,
    pub priority_hz: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub mode: TransformMode,
    pub shift: u8,
    pub xor_key: String,
    pub priority: bool,
    /// How many history entries UIs show
    pub history_display: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub tick_rate_ms: u64,
    pub sanity_start: u32,
    pub sanity_decay_ms: u64,
    pub sanity_restore: u32,
    pub possession_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/morsecast/morsecast.db".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dit_ms: 200,
            dah_ms: 600,
            pulse_gap_ms: 200,
            char_gap_ms: 500,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            driver: "bell".to_string(),
            normal_hz: crate::audio::NORMAL_FREQUENCY_HZ,
            priority_hz: crate::audio::PRIORITY_FREQUENCY_HZ,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: TransformMode::None,
            shift: 3,
            xor_key: crate::transform::DEFAULT_XOR_KEY.to_string(),
            priority: false,
            history_display: 10,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            sanity_start: 100,
            sanity_decay_ms: 3000,
            sanity_restore: 10,
            possession_ms: 8000,
        }
    }
}

impl TimingConfig {
    pub fn to_timing(&self) -> Timing {
        Timing {
            dit: Duration::from_millis(self.dit_ms),
            dah: Duration::from_millis(self.dah_ms),
            pulse_gap: Duration::from_millis(self.pulse_gap_ms),
            char_gap: Duration::from_millis(self.char_gap_ms),
        }
    }
}

impl DefaultsConfig {
    pub fn transform_params(&self) -> TransformParams {
        TransformParams {
            shift: self.shift,
            xor_key: self.xor_key.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: the built-in defaults apply.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Store path with `~` expanded
    pub fn store_path(&self) -> String {
        shellexpand::tilde(&self.store.path).to_string()
    }
}

/// Resolve the configuration file path following XDG base directory conventions
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("MORSECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("morsecast").join("config.toml"))
}
