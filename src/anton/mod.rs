//! Anton: the learned move-selection pipeline
//!
//! Every tick the agent reads its surroundings through a [`SpatialSensor`],
//! scores each candidate move with a [`DecisionModel`] and takes the best one.
//! Finished moves are graded and appended to a CSV log by the
//! [`FeedbackLogger`]; the [`Trainer`] later fits a fresh or warm-started
//! network to that log, closing the loop.
//!
//! # Layout
//!
//! - [`sensor`]: blocked neighbours, food bearing and stuck detection
//! - [`features`]: versioned feature schema, vectors and labels
//! - [`network`] / [`model`]: the dense network and its inference wrapper
//! - [`decision`]: per-tick pilot with the random stuck escape
//! - [`dataset`] / [`trainer`]: log parsing and supervised training
//! - [`feedback`]: append-only decision log
//! - [`persistence`]: weights plus metadata on disk

pub mod backend;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod error;
pub mod features;
pub mod feedback;
pub mod model;
pub mod network;
pub mod persistence;
pub mod sensor;
pub mod trainer;

pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use config::{ModelConfig, TrainerConfig};
pub use dataset::Dataset;
pub use decision::{Decision, Pilot};
pub use error::{AntonError, RowError};
pub use features::{FeatureSchema, FeatureVector, Label, TrainingExample};
pub use feedback::FeedbackLogger;
pub use model::{DecisionModel, Ranked};
pub use network::{DecisionNetwork, DecisionNetworkConfig};
pub use persistence::{load_metadata, load_model, model_exists, save_model, ModelMetadata};
pub use sensor::{SensorReading, SpatialSensor};
pub use trainer::{train_from_log, EpochStats, Trainer, TrainingReport};
