//! Train on the existing log, then play with the result
//!
//! Training is skipped with a warning when there is nothing to learn from yet
//! (no log, or no usable rows); play then proceeds with whatever model is
//! saved, or random weights. Either way the session appends to the log.

use anyhow::Result;
use tracing::warn;

use super::play::{PlayConfig, PlayMode};
use super::train::{TrainConfig, TrainMode};
use crate::anton::{AntonError, DecisionModel};
use crate::metrics::EpisodeStats;

pub struct RunMode {
    train: TrainConfig,
    play: PlayConfig,
}

impl RunMode {
    pub fn new(train: TrainConfig, play: PlayConfig) -> Self {
        Self { train, play }
    }

    pub fn run(self) -> Result<EpisodeStats> {
        let mut play = match self.train_first()? {
            Some(model) => PlayMode::new(self.play, model),
            None => PlayMode::from_config(self.play)?,
        };

        Ok(play.run()?.clone())
    }

    fn train_first(&self) -> Result<Option<DecisionModel>> {
        if !self.train.log_path.exists() {
            warn!(log = ?self.train.log_path, "no feedback log yet, skipping training");
            return Ok(None);
        }

        match TrainMode::new(self.train.clone()).run() {
            Ok((model, _)) => Ok(Some(model)),
            Err(err) if is_empty_dataset(&err) => {
                warn!(log = ?self.train.log_path, "feedback log has no usable rows, skipping training");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn is_empty_dataset(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<AntonError>(),
            Some(AntonError::EmptyDataset { .. })
        )
    })
}
