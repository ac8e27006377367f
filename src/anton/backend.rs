//! Tensor backends used by the decision pipeline
//!
//! Training runs on the NdArray CPU backend wrapped in `Autodiff`; the frozen
//! model used every tick drops the autodiff layer via `valid()` and runs on
//! plain NdArray. The network is tiny, so no GPU backend is wired in.

use burn::backend::{
    ndarray::{NdArray, NdArrayDevice},
    Autodiff,
};

/// Gradient-tracking backend the [`Trainer`](super::Trainer) runs on
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend of a model frozen for play
pub type InferenceBackend = NdArray<f32>;

/// CPU device shared by both backends
///
/// # Example
///
/// ```rust
/// use anton_snake::anton::{default_device, DecisionModel, ModelConfig};
///
/// let model: DecisionModel = DecisionModel::random(ModelConfig::default(), default_device()).unwrap();
/// assert_eq!(model.config().hidden_width, 10);
/// ```
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}
