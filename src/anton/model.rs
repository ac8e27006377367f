//! Inference wrapper around the decision network
//!
//! [`DecisionModel`] pairs frozen network weights with the feature schema they
//! were trained on. It scores one candidate move at a time, or ranks a whole
//! tick's candidates in a single batched forward pass.

use burn::tensor::{activation::softmax, backend::Backend, Tensor, TensorData};

use super::backend::InferenceBackend;
use super::config::ModelConfig;
use super::error::AntonError;
use super::features::{FeatureSchema, FeatureVector, Label};
use super::network::DecisionNetwork;

/// Best candidate of a ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    /// Index into the candidate list as presented
    pub index: usize,
    /// Probability the model assigns to accepting that candidate
    pub score: f32,
}

/// Decision network frozen for inference
#[derive(Debug, Clone)]
pub struct DecisionModel<B: Backend = InferenceBackend> {
    network: DecisionNetwork<B>,
    config: ModelConfig,
    device: B::Device,
}

impl<B: Backend> DecisionModel<B> {
    /// Wrap a network built from `config`
    pub fn new(network: DecisionNetwork<B>, config: ModelConfig, device: B::Device) -> Self {
        Self {
            network,
            config,
            device,
        }
    }

    /// Fresh model with randomly initialised weights
    pub fn random(config: ModelConfig, device: B::Device) -> Result<Self, AntonError> {
        config.validate().map_err(AntonError::InvalidConfig)?;
        let network = config.network().init::<B>(&device);
        Ok(Self::new(network, config, device))
    }

    pub fn schema(&self) -> FeatureSchema {
        self.config.schema
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn network(&self) -> &DecisionNetwork<B> {
        &self.network
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn into_network(self) -> DecisionNetwork<B> {
        self.network
    }

    /// Raw class logits for each row, `[rows][output_width]`
    pub fn logits(&self, rows: &[FeatureVector]) -> Result<Vec<Vec<f32>>, AntonError> {
        let output = self.network.forward(self.batch(rows)?);
        self.unpack(output)
    }

    /// Preference score for one candidate: the softmax probability of `Accept`
    pub fn predict(&self, features: &FeatureVector) -> Result<f32, AntonError> {
        let scores = self.scores(std::slice::from_ref(features))?;
        Ok(scores[0])
    }

    /// Accept probability for every row
    pub fn scores(&self, rows: &[FeatureVector]) -> Result<Vec<f32>, AntonError> {
        let probabilities = softmax(self.network.forward(self.batch(rows)?), 1);
        Ok(self
            .unpack(probabilities)?
            .into_iter()
            .map(|row| row[Label::Accept.index()])
            .collect())
    }

    /// Pick the highest-scoring candidate; ties go to the earliest one
    pub fn rank(&self, candidates: &[FeatureVector]) -> Result<Ranked, AntonError> {
        if candidates.is_empty() {
            return Err(AntonError::NoCandidates);
        }

        let scores = self.scores(candidates)?;
        let mut best = Ranked {
            index: 0,
            score: scores[0],
        };
        for (index, &score) in scores.iter().enumerate().skip(1) {
            if score > best.score {
                best = Ranked { index, score };
            }
        }

        Ok(best)
    }

    /// Stack feature rows into a `[rows, width]` tensor, checking the schema
    fn batch(&self, rows: &[FeatureVector]) -> Result<Tensor<B, 2>, AntonError> {
        let schema = self.schema();
        let mut flat = Vec::with_capacity(rows.len() * schema.width());
        for row in rows {
            if row.schema() != schema {
                return Err(AntonError::SchemaMismatch {
                    expected: schema.to_string(),
                    found: row.schema().to_string(),
                });
            }
            flat.extend_from_slice(row.values());
        }

        let data = TensorData::new(flat, [rows.len(), schema.width()]);
        Ok(Tensor::from_data(data, &self.device))
    }

    fn unpack(&self, output: Tensor<B, 2>) -> Result<Vec<Vec<f32>>, AntonError> {
        let [_, width] = output.dims();
        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| AntonError::TensorData(format!("{:?}", err)))?;
        Ok(values.chunks(width).map(|row| row.to_vec()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anton::backend::default_device;
    use crate::anton::sensor::SensorReading;
    use crate::game::RelativeDirection;

    fn model(schema: FeatureSchema) -> DecisionModel {
        DecisionModel::random(ModelConfig::new(schema), default_device()).unwrap()
    }

    fn reading() -> SensorReading {
        SensorReading {
            left_blocked: false,
            front_blocked: true,
            right_blocked: false,
            food_angle: Some(-0.5),
            stuck: false,
        }
    }

    fn candidates(schema: FeatureSchema) -> Vec<FeatureVector> {
        RelativeDirection::ALL
            .iter()
            .map(|&dir| FeatureVector::encode(schema, &reading(), dir))
            .collect()
    }

    #[test]
    fn test_predict_is_probability() {
        let model = model(FeatureSchema::ObstaclesWithFood);
        for features in candidates(FeatureSchema::ObstaclesWithFood) {
            let score = model.predict(&features).unwrap();
            assert!((0.0..=1.0).contains(&score), "score {}", score);
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = model(FeatureSchema::ObstaclesWithFood);
        let features = &candidates(FeatureSchema::ObstaclesWithFood)[1];

        let first = model.predict(features).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict(features).unwrap(), first);
        }

        let first_logits = model.logits(std::slice::from_ref(features)).unwrap();
        assert_eq!(model.logits(std::slice::from_ref(features)).unwrap(), first_logits);
    }

    #[test]
    fn test_rank_matches_individual_scores() {
        let model = model(FeatureSchema::Obstacles);
        let rows = candidates(FeatureSchema::Obstacles);

        let ranked = model.rank(&rows).unwrap();
        let individual: Vec<f32> = rows.iter().map(|row| model.predict(row).unwrap()).collect();
        let max = individual.iter().cloned().fold(f32::MIN, f32::max);

        assert!((ranked.score - max).abs() < 1e-6);
        assert!((individual[ranked.index] - max).abs() < 1e-6);
        // No earlier candidate reaches the winning score
        assert!(individual[..ranked.index].iter().all(|&s| s < ranked.score));
    }

    #[test]
    fn test_rank_ties_pick_first() {
        let model = model(FeatureSchema::Obstacles);
        let row = candidates(FeatureSchema::Obstacles).remove(0);
        let rows = vec![row.clone(), row.clone(), row];

        assert_eq!(model.rank(&rows).unwrap().index, 0);
    }

    #[test]
    fn test_rank_empty_is_error() {
        let model = model(FeatureSchema::Obstacles);
        assert!(matches!(model.rank(&[]), Err(AntonError::NoCandidates)));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let model = model(FeatureSchema::Obstacles);
        let foreign = &candidates(FeatureSchema::ObstaclesWithFood)[0];

        assert!(matches!(
            model.predict(foreign),
            Err(AntonError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ModelConfig {
            output_width: 3,
            ..Default::default()
        };
        assert!(matches!(
            DecisionModel::<InferenceBackend>::random(config, default_device()),
            Err(AntonError::InvalidConfig(_))
        ));
    }
}
