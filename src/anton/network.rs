//! Dense feed-forward decision network
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, input_width]
//!   ↓ Linear(input_width → hidden_width) + ReLU
//!   ↓ Linear(hidden_width → hidden_width) + ReLU
//!   ↓ Linear(hidden_width → output_width)
//! Output: [batch, output_width] class logits (reject, accept)
//! ```
//!
//! # Example
//!
//! ```rust
//! use anton_snake::anton::DecisionNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! let device = NdArrayDevice::default();
//! let network = DecisionNetworkConfig::new(5, 10, 2).init::<NdArray<f32>>(&device);
//!
//! let logits = network.forward(Tensor::zeros([3, 5], &device));
//! assert_eq!(logits.dims(), [3, 2]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::relu, backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};

/// Layer widths of the decision network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNetworkConfig {
    pub input_width: usize,
    pub hidden_width: usize,
    pub output_width: usize,
}

impl DecisionNetworkConfig {
    pub fn new(input_width: usize, hidden_width: usize, output_width: usize) -> Self {
        Self {
            input_width,
            hidden_width,
            output_width,
        }
    }

    /// Initialize a network with random weights on `device`
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecisionNetwork<B> {
        DecisionNetwork {
            layer1: LinearConfig::new(self.input_width, self.hidden_width).init(device),
            layer2: LinearConfig::new(self.hidden_width, self.hidden_width).init(device),
            layer3: LinearConfig::new(self.hidden_width, self.output_width).init(device),
        }
    }
}

/// Three dense layers with ReLU between them
///
/// Generic over the backend so the same module trains under autodiff and
/// runs inference on the plain backend after `valid()`.
#[derive(Module, Debug)]
pub struct DecisionNetwork<B: Backend> {
    layer1: Linear<B>,
    layer2: Linear<B>,
    layer3: Linear<B>,
}

impl<B: Backend> DecisionNetwork<B> {
    /// Map a batch of feature rows `[batch, input_width]` to logits `[batch, output_width]`
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.layer1.forward(features));
        let x = relu(self.layer2.forward(x));
        self.layer3.forward(x)
    }
}
