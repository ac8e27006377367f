//! Feature schema and encoding
//!
//! A feature vector is the model's input contract. Its length and column order
//! are fixed per [`FeatureSchema`]; a model trained on one schema cannot read
//! vectors, logs or snapshots written under another.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::sensor::SensorReading;
use crate::game::{Outcome, RelativeDirection};

/// Name of the trailing label column in the log
pub const LABEL_COLUMN: &str = "label";

/// How a column is encoded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Boolean written as `0` or `1`
    Flag,
    /// Radians written as float text
    Angle,
    /// Relative direction written as `-1`, `0` or `1`
    Direction,
}

/// Versioned layout of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// v1: `(left_blocked, front_blocked, right_blocked, candidate)`
    Obstacles,
    /// v2: `(left_blocked, front_blocked, right_blocked, food_angle, candidate)`
    ObstaclesWithFood,
}

const OBSTACLE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("left_blocked", ColumnKind::Flag),
    ("front_blocked", ColumnKind::Flag),
    ("right_blocked", ColumnKind::Flag),
    ("candidate", ColumnKind::Direction),
];

const FOOD_COLUMNS: &[(&str, ColumnKind)] = &[
    ("left_blocked", ColumnKind::Flag),
    ("front_blocked", ColumnKind::Flag),
    ("right_blocked", ColumnKind::Flag),
    ("food_angle", ColumnKind::Angle),
    ("candidate", ColumnKind::Direction),
];

impl FeatureSchema {
    pub fn version(self) -> u32 {
        match self {
            FeatureSchema::Obstacles => 1,
            FeatureSchema::ObstaclesWithFood => 2,
        }
    }

    /// Feature columns in order, excluding the label
    pub fn columns(self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            FeatureSchema::Obstacles => OBSTACLE_COLUMNS,
            FeatureSchema::ObstaclesWithFood => FOOD_COLUMNS,
        }
    }

    /// Number of feature columns
    pub fn width(self) -> usize {
        self.columns().len()
    }

    pub fn uses_food_angle(self) -> bool {
        matches!(self, FeatureSchema::ObstaclesWithFood)
    }

    /// Header line of a log written under this schema
    pub fn header(self) -> Vec<&'static str> {
        self.columns()
            .iter()
            .map(|(name, _)| *name)
            .chain(std::iter::once(LABEL_COLUMN))
            .collect()
    }

    /// Identify the schema a log header was written under
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Option<Self> {
        [FeatureSchema::Obstacles, FeatureSchema::ObstaclesWithFood]
            .into_iter()
            .find(|schema| {
                let expected = schema.header();
                expected.len() == header.len()
                    && expected
                        .iter()
                        .zip(header)
                        .all(|(want, got)| *want == got.as_ref().trim())
            })
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureSchema::Obstacles => "obstacles",
            FeatureSchema::ObstaclesWithFood => "obstacles_with_food",
        };
        write!(f, "{} (v{}, {} features)", name, self.version(), self.width())
    }
}

/// Encoded model input for one candidate direction
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f32>,
}

impl FeatureVector {
    /// Encode a sensor reading plus one candidate move
    pub fn encode(
        schema: FeatureSchema,
        reading: &SensorReading,
        candidate: RelativeDirection,
    ) -> Self {
        let mut values = Vec::with_capacity(schema.width());
        values.push(flag(reading.left_blocked));
        values.push(flag(reading.front_blocked));
        values.push(flag(reading.right_blocked));
        if schema.uses_food_angle() {
            values.push(reading.food_angle.unwrap_or(0.0));
        }
        values.push(f32::from(candidate.code()));

        Self { schema, values }
    }

    /// Wrap raw values; `None` if the length does not fit the schema
    pub fn from_values(schema: FeatureSchema, values: Vec<f32>) -> Option<Self> {
        (values.len() == schema.width()).then_some(Self { schema, values })
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Binary training target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Reject,
    Accept,
}

impl Label {
    /// Number of classes; the model's output width must match
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            Label::Reject => 0,
            Label::Accept => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Reject),
            1 => Some(Label::Accept),
            _ => None,
        }
    }

    /// Grade an observed outcome under a schema
    ///
    /// Obstacle-only models learn to survive. Food-aware models only accept
    /// moves that survive and also eat or approach the food.
    pub fn from_outcome(schema: FeatureSchema, outcome: &Outcome) -> Self {
        let accepted = match schema {
            FeatureSchema::Obstacles => outcome.survived,
            FeatureSchema::ObstaclesWithFood => {
                outcome.survived && (outcome.ate_food || outcome.got_closer())
            }
        };
        if accepted {
            Label::Accept
        } else {
            Label::Reject
        }
    }
}

/// One row of the training log
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: usize,
}
