//! Error types shared by configuration loading, series loading, and dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"unit[2].capacity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to load or shape the hourly series matrix.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("cannot read series file \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed series CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("series \"{name}\" has {found} values, expected {expected}")]
    Length {
        name: String,
        found: usize,
        expected: usize,
    },
    #[error("series \"{column}\" row {row}: cannot parse \"{value}\" as a number")]
    Value {
        column: String,
        row: usize,
        value: String,
    },
    #[error("duplicate series name \"{0}\"")]
    Duplicate(String),
}

/// A per-unit configuration problem. The unit is excluded from the run,
/// the run itself continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("dispatch plan references unknown unit \"{0}\"")]
    UnknownUnit(String),
    #[error("unit \"{name}\" of kind {kind} cannot appear in the dispatch plan")]
    NotDispatchable { name: String, kind: String },
    #[error("unit \"{0}\" appears more than once in the dispatch plan")]
    DuplicateEntry(String),
    #[error("unit \"{name}\" has an ambiguous pricing mode: {reason}")]
    AmbiguousPricing { name: String, reason: String },
    #[error("unit \"{name}\" has invalid economics: {reason}")]
    InvalidEconomics { name: String, reason: String },
    #[error("unit \"{0}\" has no usable capacity")]
    MissingCapacity(String),
    #[error("unit \"{name}\" references missing series \"{series}\"")]
    MissingSeries { name: String, series: String },
    #[error("unit \"{name}\" has an invalid constraint: {reason}")]
    InvalidConstraint { name: String, reason: String },
}

impl UnitError {
    /// Name of the unit the error is recorded against.
    pub fn unit(&self) -> &str {
        match self {
            Self::UnknownUnit(name) | Self::DuplicateEntry(name) | Self::MissingCapacity(name) => {
                name
            }
            Self::NotDispatchable { name, .. }
            | Self::AmbiguousPricing { name, .. }
            | Self::InvalidEconomics { name, .. }
            | Self::MissingSeries { name, .. }
            | Self::InvalidConstraint { name, .. } => name,
        }
    }
}

/// Errors that abort a dispatch run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("scenario has no load unit")]
    MissingLoad,
    #[error("load unit \"{0}\" has no series")]
    MissingLoadSeries(String),
    #[error(
        "storage \"{unit}\" left its bounds at hour {hour}: level {level:.6} outside [{min_level:.6}, {max_level:.6}]"
    )]
    InvariantViolation {
        unit: String,
        hour: usize,
        level: f64,
        min_level: f64,
        max_level: f64,
    },
}

/// Top-level error returned by [`crate::runner::run_scenario`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
