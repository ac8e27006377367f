//! Append-only CSV log of graded decisions
//!
//! Each row is one feature vector followed by its label, in the column order
//! of the schema. The header is written once, when the file is created or
//! found empty. Logging never interrupts play: a failed write is counted and
//! reported, and the row is lost.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::{trace, warn};

use super::error::AntonError;
use super::features::{ColumnKind, FeatureSchema, FeatureVector, Label};
use super::sensor::SensorReading;
use crate::game::{Outcome, RelativeDirection};

/// Single writer for one log file
#[derive(Debug)]
pub struct FeedbackLogger {
    path: PathBuf,
    schema: FeatureSchema,
    written: usize,
    dropped: usize,
}

impl FeedbackLogger {
    pub fn new(path: impl Into<PathBuf>, schema: FeatureSchema) -> Self {
        Self {
            path: path.into(),
            schema,
            written: 0,
            dropped: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Rows appended by this logger
    pub fn written(&self) -> usize {
        self.written
    }

    /// Rows lost to write failures
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Append one row, returning whether it reached the file
    pub fn record(&mut self, features: &FeatureVector, label: Label) -> bool {
        match self.try_append(features, label) {
            Ok(()) => {
                self.written += 1;
                true
            }
            Err(err) => {
                self.dropped += 1;
                warn!(path = ?self.path, %err, dropped = self.dropped, "failed to log feedback row");
                false
            }
        }
    }

    /// Grade a finished move and append it
    pub fn record_decision(
        &mut self,
        reading: &SensorReading,
        chosen: RelativeDirection,
        outcome: &Outcome,
    ) -> bool {
        let features = FeatureVector::encode(self.schema, reading, chosen);
        let label = Label::from_outcome(self.schema, outcome);
        self.record(&features, label)
    }

    /// Append one row, surfacing the error
    pub fn try_append(&self, features: &FeatureVector, label: Label) -> Result<(), AntonError> {
        if features.schema() != self.schema {
            return Err(AntonError::SchemaMismatch {
                expected: self.schema.to_string(),
                found: features.schema().to_string(),
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if file.metadata()?.len() == 0 {
            writer.write_record(self.schema.header())?;
        }
        writer.write_record(row_fields(self.schema, features, label))?;
        let buf = writer.into_inner().map_err(|err| err.into_error())?;

        // One write per row keeps a crash from leaving half a line behind
        file.write_all(&buf)?;
        trace!(bytes = buf.len(), "logged feedback row");
        Ok(())
    }
}

/// Fields of one row in schema column order, label last
pub fn row_fields(schema: FeatureSchema, features: &FeatureVector, label: Label) -> Vec<String> {
    let mut fields: Vec<String> = schema
        .columns()
        .iter()
        .zip(features.values())
        .map(|(&(_, kind), &value)| match kind {
            ColumnKind::Flag | ColumnKind::Direction => format!("{}", value as i32),
            ColumnKind::Angle => format!("{}", value),
        })
        .collect();
    fields.push(label.index().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anton::dataset::Dataset;
    use tempfile::TempDir;

    fn reading(angle: f32) -> SensorReading {
        SensorReading {
            left_blocked: true,
            front_blocked: false,
            right_blocked: false,
            food_angle: Some(angle),
            stuck: false,
        }
    }

    #[test]
    fn test_row_fields() {
        let schema = FeatureSchema::ObstaclesWithFood;
        let features = FeatureVector::encode(schema, &reading(-0.75), RelativeDirection::Left);
        assert_eq!(
            row_fields(schema, &features, Label::Accept).join(","),
            "1,0,0,-0.75,-1,1"
        );

        let schema = FeatureSchema::Obstacles;
        let features = FeatureVector::encode(schema, &reading(0.3), RelativeDirection::Right);
        assert_eq!(
            row_fields(schema, &features, Label::Reject).join(","),
            "1,0,0,1,0"
        );
    }

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let schema = FeatureSchema::ObstaclesWithFood;

        let mut logger = FeedbackLogger::new(&path, schema);
        let features = FeatureVector::encode(schema, &reading(0.5), RelativeDirection::Front);
        assert!(logger.record(&features, Label::Accept));
        assert!(logger.record(&features, Label::Reject));

        // A second logger on the same file keeps appending
        let mut again = FeedbackLogger::new(&path, schema);
        assert!(again.record(&features, Label::Accept));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], schema.header().join(","));
        assert_eq!(lines[1], "1,0,0,0.5,0,1");
        assert_eq!(lines[2], "1,0,0,0.5,0,0");
        assert_eq!(logger.written(), 2);
        assert_eq!(again.written(), 1);
    }

    #[test]
    fn test_logged_rows_load_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let schema = FeatureSchema::ObstaclesWithFood;
        let angle = std::f32::consts::FRAC_PI_3;

        let mut logger = FeedbackLogger::new(&path, schema);
        let features = FeatureVector::encode(schema, &reading(angle), RelativeDirection::Right);
        logger.record(&features, Label::Accept);

        let dataset = Dataset::load(&path, schema, Label::COUNT).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.examples()[0].features, features);
        assert_eq!(dataset.examples()[0].label, Label::Accept.index());
    }

    #[test]
    fn test_record_decision_grades_outcome() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let mut logger = FeedbackLogger::new(&path, FeatureSchema::ObstaclesWithFood);

        let died = Outcome {
            survived: false,
            ate_food: false,
            distance_before: Some(3.0),
            distance_after: Some(2.0),
        };
        assert!(logger.record_decision(&reading(0.0), RelativeDirection::Front, &died));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().nth(1).unwrap().ends_with(",0"));
    }

    #[test]
    fn test_unwritable_path_drops_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("feedback.csv");
        let schema = FeatureSchema::Obstacles;

        let mut logger = FeedbackLogger::new(&path, schema);
        let features = FeatureVector::encode(schema, &reading(0.0), RelativeDirection::Front);

        assert!(!logger.record(&features, Label::Accept));
        assert_eq!(logger.written(), 0);
        assert_eq!(logger.dropped(), 1);
    }

    #[test]
    fn test_schema_mismatch_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let logger = FeedbackLogger::new(&path, FeatureSchema::Obstacles);
        let features = FeatureVector::encode(
            FeatureSchema::ObstaclesWithFood,
            &reading(0.0),
            RelativeDirection::Front,
        );

        assert!(matches!(
            logger.try_append(&features, Label::Accept),
            Err(AntonError::SchemaMismatch { .. })
        ));
        assert!(!path.exists());
    }
}
