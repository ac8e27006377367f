//! Offline training mode
//!
//! Reads the feedback log, fits the decision network to it and saves the
//! result. If a compatible model is already saved at the target path, its
//! weights are refined instead of starting from scratch.
//!
//! # Example
//!
//! ```rust,ignore
//! use anton_snake::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(PathBuf::from("anton_log.csv"), PathBuf::from("models/anton"));
//! let (model, report) = TrainMode::new(config).run()?;
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

use crate::anton::{
    default_device, load_model, model_exists, save_model, train_from_log, DecisionModel,
    DecisionNetwork, ModelConfig, TrainerConfig, TrainingBackend, TrainingReport,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Feedback log to learn from
    pub log_path: PathBuf,

    /// Where the trained model is saved (and warm-started from)
    pub save_path: PathBuf,

    /// Refine an existing compatible model at `save_path` if there is one
    pub warm_start: bool,

    /// Print one progress line every N epochs
    pub log_frequency: usize,

    pub model_config: ModelConfig,

    pub trainer_config: TrainerConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use anton_snake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(PathBuf::from("anton_log.csv"), PathBuf::from("models/anton"));
    /// assert!(config.warm_start);
    /// ```
    pub fn new(log_path: PathBuf, save_path: PathBuf) -> Self {
        Self {
            log_path,
            save_path,
            warm_start: true,
            log_frequency: 10,
            model_config: ModelConfig::default(),
            trainer_config: TrainerConfig::default(),
        }
    }
}

/// Training mode for the decision network
pub struct TrainMode {
    config: TrainConfig,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the log and save the model
    ///
    /// Returns the trained model frozen for inference together with the
    /// per-epoch report.
    pub fn run(&self) -> Result<(DecisionModel, TrainingReport)> {
        self.print_header();

        let warm_start = self.warm_start_network();
        let (model, report) = train_from_log(
            &self.config.log_path,
            &self.config.model_config,
            &self.config.trainer_config,
            warm_start,
        )
        .with_context(|| format!("Training on {:?} failed", self.config.log_path))?;

        self.print_progress(&report);

        save_model(&model, Some(&report), &self.config.save_path).with_context(|| {
            format!("Failed to save trained model to {:?}", self.config.save_path)
        })?;

        println!("\nTraining complete!");
        println!("Model saved to: {:?}", self.config.save_path);
        if let Some(last) = report.final_epoch() {
            println!(
                "Final loss: {:.4} | Final accuracy: {:.1}%",
                last.loss,
                last.accuracy * 100.0
            );
        }

        Ok((model, report))
    }

    /// Load saved weights to refine, if enabled and compatible
    fn warm_start_network(&self) -> Option<DecisionNetwork<TrainingBackend>> {
        if !self.config.warm_start || !model_exists(&self.config.save_path) {
            return None;
        }

        match load_model::<TrainingBackend>(
            &self.config.save_path,
            &self.config.model_config,
            &default_device(),
        ) {
            Ok((model, metadata)) => {
                println!(
                    "Warm start: {:?} ({} epochs on {} examples)",
                    self.config.save_path, metadata.epochs, metadata.examples
                );
                Some(model.into_network())
            }
            Err(err) => {
                let reason = format!("{:#}", err);
                warn!(path = ?self.config.save_path, %reason, "ignoring incompatible saved model");
                None
            }
        }
    }

    fn print_header(&self) {
        let model = &self.config.model_config;
        let trainer = &self.config.trainer_config;

        println!("{}", "=".repeat(70));
        println!("Anton Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Log: {:?}", self.config.log_path);
        println!("Schema: {}", model.schema);
        println!(
            "Network: {} -> {} -> {} -> {}",
            model.schema.width(),
            model.hidden_width,
            model.hidden_width,
            model.output_width
        );
        println!("Trainer Config:");
        println!("  Epochs: {}", trainer.epochs);
        println!("  Batch size: {}", trainer.batch_size);
        println!("  Learning rate: {}", trainer.learning_rate);
        println!("  Adam betas: ({}, {})", trainer.beta_1, trainer.beta_2);
        println!("  Shuffle: {}", trainer.shuffle);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, report: &TrainingReport) {
        println!(
            "Examples: {} | Skipped rows: {}",
            report.examples, report.skipped_rows
        );

        let total = report.epochs.len();
        for stats in &report.epochs {
            if stats.epoch % self.config.log_frequency.max(1) == 0 || stats.epoch == total {
                println!(
                    "[Epoch {}/{}] Loss: {:.4} | Accuracy: {:.1}%",
                    stats.epoch,
                    total,
                    stats.loss,
                    stats.accuracy * 100.0
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anton::{load_metadata, FeatureSchema};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(path: &std::path::Path, rows: usize) {
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(
            file,
            "left_blocked,front_blocked,right_blocked,food_angle,candidate,label"
        )
        .unwrap();
        for i in 0..rows {
            // Accept moves whose target cell is open
            let blocked = i % 2;
            writeln!(file, "0,{},0,0.1,0,{}", blocked, 1 - blocked).unwrap();
        }
    }

    fn config(dir: &TempDir) -> TrainConfig {
        let mut config = TrainConfig::new(dir.path().join("log.csv"), dir.path().join("anton"));
        config.trainer_config.epochs = 3;
        config.trainer_config.seed = Some(1);
        config
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(PathBuf::from("log.csv"), PathBuf::from("anton"));
        assert_eq!(config.log_path, PathBuf::from("log.csv"));
        assert_eq!(config.save_path, PathBuf::from("anton"));
        assert_eq!(config.model_config.schema, FeatureSchema::ObstaclesWithFood);
    }

    #[test]
    fn test_train_and_save() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        write_log(&config.log_path, 20);

        let (_, report) = TrainMode::new(config.clone()).run().unwrap();

        assert_eq!(report.examples, 20);
        assert_eq!(report.epochs.len(), 3);
        assert!(model_exists(&config.save_path));
        assert_eq!(load_metadata(&config.save_path).unwrap().epochs, 3);
    }

    #[test]
    fn test_second_run_warm_starts() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        write_log(&config.log_path, 10);

        TrainMode::new(config.clone()).run().unwrap();
        let mode = TrainMode::new(config);
        assert!(mode.warm_start_network().is_some());
    }

    #[test]
    fn test_incompatible_saved_model_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        write_log(&config.log_path, 10);
        TrainMode::new(config.clone()).run().unwrap();

        let mut other = config;
        other.model_config.hidden_width = 4;
        assert!(TrainMode::new(other).warm_start_network().is_none());
    }

    #[test]
    fn test_missing_log_fails() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        assert!(TrainMode::new(config).run().is_err());
    }
}
