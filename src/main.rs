use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use anton_snake::anton::FeatureSchema;
use anton_snake::config::AppConfig;
use anton_snake::modes::{PlayConfig, PlayMode, RunMode, TrainConfig, TrainMode};

#[derive(Parser)]
#[command(name = "anton_snake")]
#[command(version, about = "Snake agent that learns from its own feedback log")]
struct Cli {
    /// What to do
    #[arg(long, default_value = "run")]
    mode: Mode,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Feedback log (CSV)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Saved model stem (`.mpk` and `.meta.json` are added)
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Episodes to play
    #[arg(long)]
    episodes: Option<usize>,

    /// Training epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Seed for game, decision and shuffle randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Feature layout for the model and the log
    #[arg(long)]
    schema: Option<Schema>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train on the feedback log and save the model
    Train,
    /// Play episodes headless, appending to the feedback log
    Play,
    /// Train on the log, then play
    Run,
}

#[derive(Clone, Copy, ValueEnum)]
enum Schema {
    /// Blocked flags and candidate only
    Obstacles,
    /// Blocked flags, food angle and candidate
    ObstaclesWithFood,
}

impl From<Schema> for FeatureSchema {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::Obstacles => FeatureSchema::Obstacles,
            Schema::ObstaclesWithFood => FeatureSchema::ObstaclesWithFood,
        }
    }
}

impl Cli {
    /// Load the config file (or defaults) and apply flag overrides
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(log) = &self.log {
            config.log_path = log.clone();
        }
        if let Some(weights) = &self.weights {
            config.weights_path = weights.clone();
        }
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(epochs) = self.epochs {
            config.trainer.epochs = epochs;
        }
        if let Some(width) = self.width {
            config.game.grid_width = width;
        }
        if let Some(height) = self.height {
            config.game.grid_height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(schema) = self.schema {
            config.model.schema = schema.into();
        }
        if config.trainer.seed.is_none() {
            config.trainer.seed = config.seed;
        }

        config
            .validate()
            .map_err(|err| anyhow!("Invalid configuration: {}", err))?;
        Ok(config)
    }
}

fn train_config(config: &AppConfig) -> TrainConfig {
    TrainConfig {
        model_config: config.model.clone(),
        trainer_config: config.trainer.clone(),
        ..TrainConfig::new(config.log_path.clone(), config.weights_path.clone())
    }
}

fn play_config(config: &AppConfig) -> PlayConfig {
    PlayConfig {
        log_path: Some(config.log_path.clone()),
        weights_path: Some(config.weights_path.clone()),
        log_frequency: config.log_frequency,
        seed: config.seed,
        game_config: config.game.clone(),
        model_config: config.model.clone(),
        ..PlayConfig::new(config.episodes)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.app_config()?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Train => {
            TrainMode::new(train_config(&config)).run()?;
        }
        Mode::Play => {
            let mut play_mode = PlayMode::from_config(play_config(&config))?;
            play_mode.run()?;
        }
        Mode::Run => {
            RunMode::new(train_config(&config), play_config(&config)).run()?;
        }
    }

    Ok(())
}
