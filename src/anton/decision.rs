//! Per-tick decision: sense, then either escape or ask the model
//!
//! A tick runs SENSE → (STUCK? → RANDOM_OVERRIDE : DECIDE). When the agent
//! has landed on its cell more than the stuck threshold allows, the model is
//! bypassed and a uniformly random candidate is taken to break the loop. The
//! caller then applies the move, observes the outcome and logs it.

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use super::error::AntonError;
use super::features::FeatureVector;
use super::model::DecisionModel;
use super::sensor::{SensorReading, SpatialSensor};
use crate::game::{AgentState, Grid, RelativeDirection};

/// How the next move was chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Stuck escape: random pick, model not consulted
    RandomOverride(RelativeDirection),
    /// Highest-scoring candidate from the model
    ModelChoice {
        direction: RelativeDirection,
        score: f32,
    },
}

impl Decision {
    pub fn direction(&self) -> RelativeDirection {
        match *self {
            Decision::RandomOverride(direction) => direction,
            Decision::ModelChoice { direction, .. } => direction,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Decision::RandomOverride(_))
    }
}

/// Drives the sensor and the model for one agent
///
/// All randomness (candidate shuffling and stuck escapes) comes from the
/// injected `rng`, so a seeded generator reproduces a run exactly.
pub struct Pilot<R: Rng> {
    sensor: SpatialSensor,
    model: DecisionModel,
    rng: R,
    shuffle_candidates: bool,
}

impl<R: Rng> Pilot<R> {
    pub fn new(sensor: SpatialSensor, model: DecisionModel, rng: R) -> Self {
        Self {
            sensor,
            model,
            rng,
            shuffle_candidates: true,
        }
    }

    /// Present candidates in the fixed `[front, left, right]` order
    pub fn with_fixed_order(mut self) -> Self {
        self.shuffle_candidates = false;
        self
    }

    pub fn model(&self) -> &DecisionModel {
        &self.model
    }

    pub fn sensor(&self) -> &SpatialSensor {
        &self.sensor
    }

    /// Candidate moves for this tick, shuffled unless fixed order was requested
    pub fn candidates(&mut self) -> Vec<RelativeDirection> {
        let mut candidates = RelativeDirection::ALL.to_vec();
        if self.shuffle_candidates {
            candidates.shuffle(&mut self.rng);
        }
        candidates
    }

    /// Choose among `candidates` given an already-sensed reading
    pub fn decide(
        &mut self,
        reading: &SensorReading,
        candidates: &[RelativeDirection],
    ) -> Result<Decision, AntonError> {
        if reading.stuck {
            let direction = *candidates
                .choose(&mut self.rng)
                .ok_or(AntonError::NoCandidates)?;
            return Ok(Decision::RandomOverride(direction));
        }

        let schema = self.model.schema();
        let rows: Vec<FeatureVector> = candidates
            .iter()
            .map(|&candidate| FeatureVector::encode(schema, reading, candidate))
            .collect();
        let ranked = self.model.rank(&rows)?;

        Ok(Decision::ModelChoice {
            direction: candidates[ranked.index],
            score: ranked.score,
        })
    }

    /// Sense the grid and decide; an override resets the cell's stuck counter
    pub fn tick(
        &mut self,
        agent: &AgentState,
        grid: &mut Grid,
    ) -> Result<(SensorReading, Decision), AntonError> {
        let reading = self.sensor.sense(agent, grid);
        let candidates = self.candidates();
        let decision = self.decide(&reading, &candidates)?;

        if decision.is_override() {
            debug!(position = ?agent.position, "stuck, overriding with random move");
            grid.reset_stuck(agent.position);
        }

        Ok((reading, decision))
    }
}
