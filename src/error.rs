//! Error types for the delay pipeline

use thiserror::Error;

/// Rejection of a prediction request payload.
///
/// Any variant rejects the whole request; no flight in the batch is scored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing `flights` field")]
    MissingFlights,

    #[error("`flights` must be an array")]
    FlightsNotArray,

    #[error("flight {index}: record must be a JSON object")]
    FlightNotObject { index: usize },

    #[error("flight {index}: invalid {field}: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

/// Failure to derive a delay label from a pair of timestamps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    #[error("invalid {field} timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure while fitting a classifier.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("cannot weight classes: {negatives} negative and {positives} positive labels")]
    DegenerateLabels { negatives: usize, positives: usize },

    #[error("label {value} at row {index} is not 0 or 1")]
    InvalidLabel { index: usize, value: u8 },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("solver failed: {0}")]
    Solver(String),

    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Failure to read, parse or accept a persisted model.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported artifact version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("incompatible feature columns: {0}")]
    IncompatibleColumns(String),

    #[error("cannot persist an unfitted classifier")]
    Unfitted,
}
