//! Saving and loading trained decision models
//!
//! A model is stored as two files side by side:
//! - `<path>.mpk`: network weights (Burn named MessagePack record)
//! - `<path>.meta.json`: layer widths, feature schema and training summary
//!
//! Loading checks the metadata against the caller's expected configuration
//! before any weights are read, so a model trained on one feature layout can
//! never silently score vectors of another.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::ModelConfig;
use super::error::AntonError;
use super::features::FeatureSchema;
use super::model::DecisionModel;
use super::network::DecisionNetworkConfig;
use super::trainer::TrainingReport;

/// Metadata saved with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Layer widths the weights were built with
    pub network: DecisionNetworkConfig,

    /// Feature layout the model reads
    pub schema: FeatureSchema,

    /// Schema version, duplicated for readers that don't know the enum
    pub schema_version: u32,

    /// Column names in input order
    pub columns: Vec<String>,

    /// Training epochs run to produce these weights
    pub epochs: usize,

    /// Examples in the training set
    pub examples: usize,

    /// Loss after the last epoch, if trained
    pub final_loss: Option<f32>,

    /// Accuracy after the last epoch, if trained
    pub final_accuracy: Option<f32>,

    /// Crate version that wrote the file
    pub version: String,
}

impl ModelMetadata {
    pub fn new(config: &ModelConfig, report: Option<&TrainingReport>) -> Self {
        let last = report.and_then(TrainingReport::final_epoch);
        Self {
            network: config.network(),
            schema: config.schema,
            schema_version: config.schema.version(),
            columns: config
                .schema
                .header()
                .into_iter()
                .take(config.schema.width())
                .map(str::to_string)
                .collect(),
            epochs: report.map_or(0, |r| r.epochs.len()),
            examples: report.map_or(0, |r| r.examples),
            final_loss: last.map(|e| e.loss),
            final_accuracy: last.map(|e| e.accuracy),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Check that these weights fit `expected`
    pub fn check(&self, expected: &ModelConfig) -> Result<(), AntonError> {
        if self.schema != expected.schema || self.schema_version != expected.schema.version() {
            return Err(AntonError::SchemaMismatch {
                expected: expected.schema.to_string(),
                found: format!("{} (stored v{})", self.schema, self.schema_version),
            });
        }

        if self.network != expected.network() {
            return Err(AntonError::InvalidConfig(format!(
                "stored layer widths {:?} do not match configured {:?}",
                self.network,
                expected.network()
            )));
        }

        Ok(())
    }
}

/// `path` with `suffix` appended to its full file name, dots included
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn weights_path(path: &Path) -> PathBuf {
    with_suffix(path, ".mpk")
}

fn metadata_path(path: &Path) -> PathBuf {
    with_suffix(path, ".meta.json")
}

/// Save a model and its metadata
///
/// `path` is the stem; extensions are added. Parent directories are created
/// if needed.
pub fn save_model<B: Backend>(
    model: &DecisionModel<B>,
    report: Option<&TrainingReport>,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let record = model.network().clone().into_record();
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, weights_path(path))
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(model.config(), report);
    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    info!(path = ?weights_path(path), schema = %metadata.schema, "saved model");
    Ok(())
}

/// Read only the metadata of a saved model
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    serde_json::from_str(&meta_json).context("Failed to deserialize metadata")
}

/// Load a saved model, refusing weights built for a different configuration
pub fn load_model<B: Backend>(
    path: &Path,
    expected: &ModelConfig,
    device: &B::Device,
) -> Result<(DecisionModel<B>, ModelMetadata)> {
    let metadata = load_metadata(path)?;
    metadata
        .check(expected)
        .with_context(|| format!("Saved model {:?} is incompatible", path))?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(weights_path(path), device)
        .with_context(|| format!("Failed to load network weights from {:?}", weights_path(path)))?;

    let network = expected.network().init::<B>(device).load_record(record);
    let model = DecisionModel::new(network, expected.clone(), device.clone());

    info!(path = ?weights_path(path), schema = %metadata.schema, "loaded model");
    Ok((model, metadata))
}

/// Whether both files of a saved model exist at `path`
pub fn model_exists(path: &Path) -> bool {
    weights_path(path).exists() && metadata_path(path).exists()
}
