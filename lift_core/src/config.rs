//! Configuration file support for Lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::engine::EngineSettings;
use crate::ranker::RECENT_EXERCISE_DAYS;
use crate::selector::RECENT_CATEGORY_DAYS;
use crate::session::INITIAL_CANDIDATES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Longest recency window accepted from a config file
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Recommendation engine tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Categories trained within this many days are avoided as primary
    #[serde(default = "default_recent_category_days")]
    pub recent_category_days: i64,

    /// Exercises used within this many days rank behind the rest
    #[serde(default = "default_recent_exercise_days")]
    pub recent_exercise_days: i64,

    /// Plans generated up front when a session starts
    #[serde(default = "default_initial_candidates")]
    pub initial_candidates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recent_category_days: default_recent_category_days(),
            recent_exercise_days: default_recent_exercise_days(),
            initial_candidates: default_initial_candidates(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, days) in [
            ("recent_category_days", self.recent_category_days),
            ("recent_exercise_days", self.recent_exercise_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_WINDOW_DAYS, days
                )));
            }
        }
        if self.initial_candidates == 0 {
            return Err(Error::Config("initial_candidates must be at least 1".into()));
        }
        Ok(())
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            recent_category_days: self.recent_category_days,
            recent_exercise_days: self.recent_exercise_days,
            initial_candidates: self.initial_candidates,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("lift")
}

fn default_recent_category_days() -> i64 {
    RECENT_CATEGORY_DAYS
}

fn default_recent_exercise_days() -> i64 {
    RECENT_EXERCISE_DAYS
}

fn default_initial_candidates() -> usize {
    INITIAL_CANDIDATES
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.engine.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("lift").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
