use thiserror::Error;

/// Errors raised by the decision and training pipeline
#[derive(Debug, Error)]
pub enum AntonError {
    #[error("cannot train: dataset has no usable examples ({skipped} rows skipped)")]
    EmptyDataset { skipped: usize },

    #[error("feature schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("no candidate directions to rank")]
    NoCandidates,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tensor data conversion failed: {0}")]
    TensorData(String),

    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("log file CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reason a single log row was rejected while loading a dataset
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} columns, found {found}")]
    WrongColumnCount { expected: usize, found: usize },

    #[error("column `{column}` is not numeric: {value:?}")]
    NotNumeric { column: &'static str, value: String },

    #[error("column `{column}` holds an unknown direction code {value}")]
    BadDirection { column: &'static str, value: String },

    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },
}
