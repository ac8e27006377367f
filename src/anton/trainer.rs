//! Offline supervised training of the decision network
//!
//! Each epoch shuffles the example order, walks it in mini-batches (the last
//! one may be short) and takes one Adam step per batch on the cross-entropy
//! between the network's logits and the logged labels.

use std::path::Path;

use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{activation::log_softmax, backend::AutodiffBackend, ElementConversion, Int, Tensor},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use super::backend::{default_device, InferenceBackend, TrainingBackend};
use super::config::{ModelConfig, TrainerConfig};
use super::dataset::Dataset;
use super::error::AntonError;
use super::features::Label;
use super::model::DecisionModel;
use super::network::DecisionNetwork;

/// Loss and accuracy over one pass of the dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub epoch: usize,
    /// Mean cross-entropy, weighted by batch size
    pub loss: f32,
    /// Per-batch fraction of argmax hits, averaged over the epoch's batches
    pub accuracy: f32,
}

/// Summary of a completed training run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub epochs: Vec<EpochStats>,
    pub examples: usize,
    pub skipped_rows: usize,
}

impl TrainingReport {
    pub fn first_epoch(&self) -> Option<&EpochStats> {
        self.epochs.first()
    }

    pub fn final_epoch(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }
}

/// Fits a [`DecisionNetwork`] to a [`Dataset`]
pub struct Trainer<B: AutodiffBackend> {
    config: TrainerConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(config: TrainerConfig, device: B::Device) -> Result<Self, AntonError> {
        config.validate().map_err(AntonError::InvalidConfig)?;
        Ok(Self { config, device })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train `network` for the configured number of epochs
    ///
    /// Fails with [`AntonError::EmptyDataset`] before touching the weights if
    /// there is nothing to learn from.
    pub fn train(
        &self,
        mut network: DecisionNetwork<B>,
        dataset: &Dataset,
    ) -> Result<(DecisionNetwork<B>, TrainingReport), AntonError> {
        if dataset.is_empty() {
            return Err(AntonError::EmptyDataset {
                skipped: dataset.skipped_rows(),
            });
        }

        let mut optim = AdamConfig::new()
            .with_beta_1(self.config.beta_1)
            .with_beta_2(self.config.beta_2)
            .with_epsilon(self.config.epsilon)
            .init::<B, DecisionNetwork<B>>();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            examples = dataset.len(),
            skipped = dataset.skipped_rows(),
            epochs = self.config.epochs,
            batch_size = self.config.batch_size,
            "training decision network"
        );

        let mut report = TrainingReport {
            epochs: Vec::with_capacity(self.config.epochs),
            examples: dataset.len(),
            skipped_rows: dataset.skipped_rows(),
        };

        for epoch in 1..=self.config.epochs {
            let batches = if self.config.shuffle {
                dataset.batch_indices(self.config.batch_size, Some(&mut rng))
            } else {
                dataset.batch_indices::<StdRng>(self.config.batch_size, None)
            };

            let mut total_loss = 0.0f32;
            let mut accuracy_sum = 0.0f32;

            for indices in &batches {
                let (features, labels) = dataset.batch::<B>(indices, &self.device);

                let logits = network.forward(features);
                let predicted = argmax_rows(logits.clone())?;
                let correct = predicted
                    .iter()
                    .zip(dataset.labels(indices))
                    .filter(|(p, label)| **p == *label)
                    .count();
                accuracy_sum += correct as f32 / indices.len() as f32;

                let loss = cross_entropy(logits, labels);
                let grads = GradientsParams::from_grads(loss.backward(), &network);
                network = optim.step(self.config.learning_rate, network, grads);

                total_loss += loss.into_scalar().elem::<f32>() * indices.len() as f32;
            }

            let stats = EpochStats {
                epoch,
                loss: total_loss / dataset.len() as f32,
                accuracy: accuracy_sum / batches.len() as f32,
            };
            debug!(
                epoch,
                loss = stats.loss,
                accuracy = stats.accuracy,
                batches = batches.len(),
                "epoch complete"
            );
            report.epochs.push(stats);
        }

        if let Some(last) = report.final_epoch() {
            info!(
                loss = last.loss,
                accuracy = last.accuracy,
                "training complete"
            );
        }

        Ok((network, report))
    }
}

/// Mean negative log-likelihood of the labelled class
fn cross_entropy<B: AutodiffBackend>(
    logits: Tensor<B, 2>,
    labels: Tensor<B, 1, Int>,
) -> Tensor<B, 1> {
    log_softmax(logits, 1)
        .gather(1, labels.unsqueeze_dim(1))
        .mean()
        .neg()
}

fn argmax_rows<B: AutodiffBackend>(logits: Tensor<B, 2>) -> Result<Vec<usize>, AntonError> {
    let [_, width] = logits.dims();
    let values = logits
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| AntonError::TensorData(format!("{:?}", err)))?;

    Ok(values
        .chunks(width)
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
                .0
        })
        .collect())
}

/// Load a feedback log, train on it and freeze the result for inference
///
/// With `warm_start` the given weights are refined; otherwise training starts
/// from a freshly initialised network.
pub fn train_from_log(
    log_path: &Path,
    model_config: &ModelConfig,
    trainer_config: &TrainerConfig,
    warm_start: Option<DecisionNetwork<TrainingBackend>>,
) -> anyhow::Result<(DecisionModel<InferenceBackend>, TrainingReport)> {
    model_config
        .validate()
        .map_err(AntonError::InvalidConfig)?;

    let device = default_device();
    let dataset = Dataset::load(log_path, model_config.schema, Label::COUNT)?;
    let network =
        warm_start.unwrap_or_else(|| model_config.network().init::<TrainingBackend>(&device));

    let trainer = Trainer::<TrainingBackend>::new(trainer_config.clone(), device.clone())?;
    let (network, report) = trainer.train(network, &dataset)?;

    let model = DecisionModel::new(network.valid(), model_config.clone(), device);
    Ok((model, report))
}
