//! Top-level configuration file
//!
//! Every section is optional in the JSON; missing fields take their defaults.
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::anton::{ModelConfig, TrainerConfig};
use crate::game::GameConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub model: ModelConfig,
    pub trainer: TrainerConfig,

    /// Feedback log the player appends to and the trainer reads
    ///
    /// Default: `anton_log.csv`
    pub log_path: PathBuf,

    /// Stem of the saved model (`.mpk` and `.meta.json` are added)
    ///
    /// Default: `models/anton`
    pub weights_path: PathBuf,

    /// Episodes to play
    ///
    /// Default: 100
    pub episodes: usize,

    /// Print progress every N episodes
    ///
    /// Default: 10
    pub log_frequency: usize,

    /// Seed for the game and decision RNGs; `None` draws from the OS
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn validate(&self) -> Result<(), String> {
        self.game.validate()?;
        self.model.validate()?;
        self.trainer.validate()?;

        if self.log_frequency == 0 {
            return Err("log_frequency must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            model: ModelConfig::default(),
            trainer: TrainerConfig::default(),
            log_path: PathBuf::from("anton_log.csv"),
            weights_path: PathBuf::from("models/anton"),
            episodes: 100,
            log_frequency: 10,
            seed: None,
        }
    }
}
