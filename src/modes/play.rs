//! Headless play mode
//!
//! Runs episodes of the grid game with the decision pipeline at the wheel.
//! Every tick is sensed, decided, applied to the engine, graded and appended
//! to the feedback log, so each session grows the dataset the next training
//! run learns from.

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::anton::{
    default_device, load_model, model_exists, DecisionModel, FeedbackLogger, InferenceBackend,
    ModelConfig, Pilot, SpatialSensor,
};
use crate::game::{GameConfig, GameEngine, Termination};
use crate::metrics::EpisodeStats;

/// Configuration for play mode
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Number of episodes to run
    pub num_episodes: usize,

    /// Feedback log to append to; `None` plays without logging
    pub log_path: Option<PathBuf>,

    /// Saved model to play with; a fresh random model is used if absent
    pub weights_path: Option<PathBuf>,

    /// Print progress every N episodes
    pub log_frequency: usize,

    /// Seed for the game and the pilot
    pub seed: Option<u64>,

    pub game_config: GameConfig,

    pub model_config: ModelConfig,
}

impl PlayConfig {
    pub fn new(num_episodes: usize) -> Self {
        Self {
            num_episodes,
            log_path: None,
            weights_path: None,
            log_frequency: 10,
            seed: None,
            game_config: GameConfig::default(),
            model_config: ModelConfig::default(),
        }
    }
}

/// How a single episode went
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub ticks: usize,
    pub score: u32,
    pub overrides: usize,
    pub termination: Termination,
}

/// Plays episodes and logs every decision
pub struct PlayMode {
    engine: GameEngine<StdRng>,
    pilot: Pilot<StdRng>,
    logger: Option<FeedbackLogger>,
    stats: EpisodeStats,
    config: PlayConfig,
}

impl PlayMode {
    /// Build a play mode around an already loaded model
    pub fn new(config: PlayConfig, model: DecisionModel) -> Self {
        let (game_rng, pilot_rng) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };

        let sensor = SpatialSensor::new(
            config.game_config.stuck_threshold,
            model.schema().uses_food_angle(),
        );
        let logger = config
            .log_path
            .as_ref()
            .map(|path| FeedbackLogger::new(path, model.schema()));

        Self {
            engine: GameEngine::new(config.game_config.clone(), game_rng),
            pilot: Pilot::new(sensor, model, pilot_rng),
            logger,
            stats: EpisodeStats::new(100),
            config,
        }
    }

    /// Load the saved model named in `config`, or start from random weights
    pub fn from_config(config: PlayConfig) -> Result<Self> {
        let device = default_device();
        let model = match &config.weights_path {
            Some(path) if model_exists(path) => {
                let (model, _) = load_model::<InferenceBackend>(path, &config.model_config, &device)
                    .with_context(|| format!("Failed to load model from {:?}", path))?;
                model
            }
            other => {
                warn!(path = ?other, "no saved model, playing with random weights");
                DecisionModel::<InferenceBackend>::random(config.model_config.clone(), device)?
            }
        };

        Ok(Self::new(config, model))
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn logger(&self) -> Option<&FeedbackLogger> {
        self.logger.as_ref()
    }

    /// Play all configured episodes
    pub fn run(&mut self) -> Result<&EpisodeStats> {
        self.print_header();

        for episode in 0..self.config.num_episodes {
            let summary = self.run_episode()?;
            debug!(
                episode = episode + 1,
                ticks = summary.ticks,
                score = summary.score,
                overrides = summary.overrides,
                "episode finished"
            );

            self.stats.record_episode(
                summary.ticks,
                summary.score,
                summary.overrides,
                summary.termination,
            );

            if (episode + 1) % self.config.log_frequency.max(1) == 0 {
                self.print_progress(episode + 1);
            }
        }

        if let Some(logger) = &self.logger {
            self.stats.record_dropped_rows(logger.dropped());
        }

        println!("\nPlay complete!");
        println!("{}", self.stats.format_summary());
        if let Some(logger) = &self.logger {
            println!(
                "Logged {} rows to {:?} ({} dropped)",
                logger.written(),
                logger.path(),
                logger.dropped()
            );
        }

        Ok(&self.stats)
    }

    /// Play one episode to the end
    ///
    /// Each tick: sense, decide (or escape when stuck), apply the move, grade
    /// the outcome and log it.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let mut state = self.engine.reset();
        let mut overrides = 0;

        loop {
            let agent = state.agent();
            let (reading, decision) = self.pilot.tick(&agent, &mut state.grid)?;
            if decision.is_override() {
                overrides += 1;
            }

            let result = self.engine.step(&mut state, decision.direction());

            if let Some(logger) = &mut self.logger {
                logger.record_decision(&reading, decision.direction(), &result.outcome);
            }

            if let Some(termination) = result.termination {
                return Ok(EpisodeSummary {
                    ticks: state.ticks as usize,
                    score: state.score,
                    overrides,
                    termination,
                });
            }
        }
    }

    fn print_header(&self) {
        let game = &self.config.game_config;

        println!("{}", "=".repeat(70));
        println!("Anton Play - Snake");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!(
            "Game Config: {}x{} grid, walls: {}, tick cap: {}",
            game.grid_width, game.grid_height, game.border_walls, game.max_ticks
        );
        println!("Schema: {}", self.pilot.model().schema());
        println!("Stuck threshold: {}", self.pilot.sensor().stuck_threshold());
        match &self.config.log_path {
            Some(path) => println!("Feedback log: {:?}", path),
            None => println!("Feedback log: disabled"),
        }
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {}",
            episode,
            self.config.num_episodes,
            self.stats.format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anton::{Dataset, FeatureSchema, Label};
    use tempfile::TempDir;

    fn config(episodes: usize) -> PlayConfig {
        let mut config = PlayConfig::new(episodes);
        config.game_config = GameConfig::small();
        config.game_config.max_ticks = 50;
        config.seed = Some(11);
        config
    }

    #[test]
    fn test_episode_terminates() {
        let mut mode = PlayMode::from_config(config(1)).unwrap();
        let summary = mode.run_episode().unwrap();

        assert!(summary.ticks >= 1);
        assert!(summary.ticks <= 50);
        if summary.termination == Termination::TickLimit {
            assert_eq!(summary.ticks, 50);
        }
    }

    #[test]
    fn test_every_tick_is_logged() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("log.csv");
        let mut config = config(3);
        config.log_path = Some(log_path.clone());

        let mut mode = PlayMode::from_config(config).unwrap();
        let stats = mode.run().unwrap().clone();

        let logger = mode.logger().unwrap();
        assert_eq!(logger.written(), stats.total_ticks());
        assert_eq!(logger.dropped(), 0);

        let dataset =
            Dataset::load(&log_path, FeatureSchema::ObstaclesWithFood, Label::COUNT).unwrap();
        assert_eq!(dataset.len(), stats.total_ticks());
        assert_eq!(dataset.skipped_rows(), 0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let model = DecisionModel::random(ModelConfig::default(), default_device()).unwrap();
        let run = |model: DecisionModel| {
            let mut mode = PlayMode::new(config(1), model);
            (0..3)
                .map(|_| mode.run_episode().unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(model.clone()), run(model));
    }

    #[test]
    fn test_stats_accumulate() {
        let mut mode = PlayMode::from_config(config(4)).unwrap();
        let stats = mode.run().unwrap();

        assert_eq!(stats.total_episodes(), 4);
        assert_eq!(stats.deaths() + stats.timeouts(), 4);
    }
}
