//! Training dataset parsed from the feedback log
//!
//! The whole log is read into memory once. Rows that do not fit the schema
//! are skipped and counted rather than aborting the load; a header written
//! under a different schema aborts it, since every row below would be misread.

use std::path::Path;

use anyhow::Context;
use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use csv::{ReaderBuilder, StringRecord, Trim};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

use super::error::{AntonError, RowError};
use super::features::{ColumnKind, FeatureSchema, FeatureVector, TrainingExample};
use crate::game::RelativeDirection;

/// Examples loaded from a log, in file order
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: FeatureSchema,
    examples: Vec<TrainingExample>,
    skipped_rows: usize,
}

impl Dataset {
    /// Build a dataset from already-parsed examples
    pub fn from_examples(schema: FeatureSchema, examples: Vec<TrainingExample>) -> Self {
        Self {
            schema,
            examples,
            skipped_rows: 0,
        }
    }

    /// Read and parse a log file
    ///
    /// A missing file is an I/O error; an existing but empty file yields an
    /// empty dataset.
    pub fn load(path: &Path, schema: FeatureSchema, classes: usize) -> anyhow::Result<Self> {
        let contents = std::fs::read(path)
            .with_context(|| format!("Failed to read training log {:?}", path))?;
        let dataset = Self::parse(contents.as_slice(), schema, classes)
            .with_context(|| format!("Failed to parse training log {:?}", path))?;
        Ok(dataset)
    }

    /// Parse CSV rows from any reader
    pub fn parse<R: std::io::Read>(
        reader: R,
        schema: FeatureSchema,
        classes: usize,
    ) -> Result<Self, AntonError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut examples = Vec::new();
        let mut skipped_rows = 0;

        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    debug!(line = line + 1, %err, "skipping unreadable row");
                    skipped_rows += 1;
                    continue;
                }
            };

            if record.iter().all(str::is_empty) {
                continue;
            }

            if line == 0 && is_header(&record) {
                check_header(&record, schema)?;
                continue;
            }

            match parse_row(&record, schema, classes) {
                Ok(example) => examples.push(example),
                Err(err) => {
                    debug!(line = line + 1, %err, "skipping malformed row");
                    skipped_rows += 1;
                }
            }
        }

        if skipped_rows > 0 {
            warn!(
                skipped_rows,
                kept = examples.len(),
                "skipped malformed rows in training log"
            );
        }

        Ok(Self {
            schema,
            examples,
            skipped_rows,
        })
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Rows rejected while parsing
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Split example indices into batches
    ///
    /// With an `rng` the index order is shuffled first; the examples themselves
    /// are never reordered. The final batch keeps whatever is left over.
    pub fn batch_indices<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: Option<&mut R>,
    ) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        if let Some(rng) = rng {
            indices.shuffle(rng);
        }

        indices
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Feature and label tensors for the given example indices
    ///
    /// Returns features `[batch, width]` and labels `[batch]`.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> (Tensor<B, 2>, Tensor<B, 1, Int>) {
        let width = self.schema.width();
        let mut features = Vec::with_capacity(indices.len() * width);
        let mut labels = Vec::with_capacity(indices.len());

        for &i in indices {
            let example = &self.examples[i];
            features.extend_from_slice(example.features.values());
            labels.push(example.label as i32);
        }

        let features = Tensor::from_data(TensorData::new(features, [indices.len(), width]), device);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device);
        (features, labels)
    }

    /// Labels of the given examples, in order
    pub fn labels(&self, indices: &[usize]) -> Vec<usize> {
        indices.iter().map(|&i| self.examples[i].label).collect()
    }
}

/// A first row whose leading field is not a number is taken as a header
fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .map_or(false, |field| field.parse::<f32>().is_err())
}

fn check_header(record: &StringRecord, expected: FeatureSchema) -> Result<(), AntonError> {
    let fields: Vec<&str> = record.iter().collect();
    match FeatureSchema::from_header(&fields) {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(AntonError::SchemaMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }),
        None => Err(AntonError::SchemaMismatch {
            expected: expected.to_string(),
            found: format!("unknown header {:?}", fields.join(",")),
        }),
    }
}

/// Parse one data row: feature columns in schema order, then the label
pub fn parse_row(
    record: &StringRecord,
    schema: FeatureSchema,
    classes: usize,
) -> Result<TrainingExample, RowError> {
    let columns = schema.columns();
    let expected = columns.len() + 1;
    if record.len() != expected {
        return Err(RowError::WrongColumnCount {
            expected,
            found: record.len(),
        });
    }

    let mut values = Vec::with_capacity(columns.len());
    for (&(name, kind), field) in columns.iter().zip(record.iter()) {
        let value: f32 = field
            .parse()
            .ok()
            .filter(|v: &f32| v.is_finite())
            .ok_or_else(|| RowError::NotNumeric {
                column: name,
                value: field.to_string(),
            })?;

        match kind {
            ColumnKind::Flag if value != 0.0 && value != 1.0 => {
                return Err(RowError::NotNumeric {
                    column: name,
                    value: field.to_string(),
                });
            }
            ColumnKind::Direction if direction_code(value).is_none() => {
                return Err(RowError::BadDirection {
                    column: name,
                    value: field.to_string(),
                });
            }
            _ => {}
        }
        values.push(value);
    }

    let label_field = &record[columns.len()];
    let label: usize = label_field.parse().map_err(|_| RowError::NotNumeric {
        column: super::features::LABEL_COLUMN,
        value: label_field.to_string(),
    })?;
    if label >= classes {
        return Err(RowError::LabelOutOfRange { label, classes });
    }

    let features = FeatureVector::from_values(schema, values).ok_or(RowError::WrongColumnCount {
        expected,
        found: record.len(),
    })?;

    Ok(TrainingExample { features, label })
}

fn direction_code(value: f32) -> Option<RelativeDirection> {
    if value.fract() != 0.0 {
        return None;
    }
    RelativeDirection::from_code(value as i8)
}
