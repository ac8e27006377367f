//! Model shape and training hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::features::{FeatureSchema, Label};
use super::network::DecisionNetworkConfig;

/// Shape of the decision model
///
/// The input width is not configurable on its own: it always follows the
/// feature schema, so a model and the logs it reads agree by construction.
///
/// # Example
///
/// ```rust
/// use anton_snake::anton::{FeatureSchema, ModelConfig};
///
/// let config = ModelConfig::new(FeatureSchema::ObstaclesWithFood);
/// assert_eq!(config.network().input_width, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature layout the model reads
    ///
    /// Default: obstacles with food angle
    pub schema: FeatureSchema,

    /// Width of both hidden layers
    ///
    /// Default: 10
    pub hidden_width: usize,

    /// Number of output classes (reject/accept)
    ///
    /// Default: 2
    pub output_width: usize,
}

impl ModelConfig {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Layer widths for building the network
    pub fn network(&self) -> DecisionNetworkConfig {
        DecisionNetworkConfig::new(self.schema.width(), self.hidden_width, self.output_width)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.hidden_width == 0 {
            return Err("hidden_width must be at least 1".to_string());
        }

        if self.output_width != Label::COUNT {
            return Err(format!(
                "output_width must equal the label cardinality ({}), got {}",
                Label::COUNT,
                self.output_width
            ));
        }

        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            schema: FeatureSchema::ObstaclesWithFood,
            hidden_width: 10,
            output_width: Label::COUNT,
        }
    }
}

/// Hyperparameters for offline training
///
/// # Example
///
/// ```rust
/// use anton_snake::anton::TrainerConfig;
///
/// let config = TrainerConfig {
///     epochs: 20,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Passes over the full dataset
    ///
    /// Default: 50
    pub epochs: usize,

    /// Examples per gradient step; the last batch of an epoch may be shorter
    ///
    /// Default: 32
    pub batch_size: usize,

    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-2
    pub learning_rate: f64,

    /// Adam first-moment decay
    ///
    /// Default: 0.9
    pub beta_1: f32,

    /// Adam second-moment decay
    ///
    /// Default: 0.999
    pub beta_2: f32,

    /// Numerical-stability term added to the second-moment denominator
    ///
    /// Default: 1e-8
    pub epsilon: f32,

    /// Shuffle example order before batching each epoch
    ///
    /// Default: true
    pub shuffle: bool,

    /// Seed for the shuffle; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.epochs == 0 {
            return Err("epochs must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..1.0).contains(&self.beta_1) {
            return Err(format!("beta_1 must be in [0, 1), got {}", self.beta_1));
        }

        if !(0.0..1.0).contains(&self.beta_2) {
            return Err(format!("beta_2 must be in [0, 1), got {}", self.beta_2));
        }

        if self.epsilon <= 0.0 {
            return Err(format!("epsilon must be positive, got {}", self.epsilon));
        }

        Ok(())
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            learning_rate: 1e-2,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
            shuffle: true,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.schema, FeatureSchema::ObstaclesWithFood);
        assert_eq!(config.hidden_width, 10);
        assert_eq!(config.output_width, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_network_follows_schema() {
        let config = ModelConfig::new(FeatureSchema::Obstacles);
        let network = config.network();
        assert_eq!(network.input_width, 4);
        assert_eq!(network.hidden_width, 10);
        assert_eq!(network.output_width, 2);
    }

    #[test]
    fn test_validation_output_width_must_match_labels() {
        let config = ModelConfig {
            output_width: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_hidden() {
        let config = ModelConfig {
            hidden_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_trainer_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.epochs, 50);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.learning_rate, 1e-2);
        assert_eq!(config.epsilon, 1e-8);
        assert!(config.shuffle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trainer_validation() {
        let mut config = TrainerConfig::default();
        config.epochs = 0;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.learning_rate = -0.1;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.beta_2 = 1.0;
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.epsilon = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ModelConfig::new(FeatureSchema::Obstacles);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"obstacles\""));

        let parsed: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
