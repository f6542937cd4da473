use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::models::RecordField;

/// All errors produced by the sensor readings service.
///
/// The source-related variants are fatal at startup: a store is never built
/// from a source that failed to load.
#[derive(Error, Debug)]
pub enum SensorError {
    /// The source file could not be opened or read from disk.
    #[error("Failed to read source {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source could not be parsed as tabular data.
    #[error("Malformed source {path}: {source}")]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The source header lacks a column the loader needs.
    #[error("Source {path} is missing expected column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    /// A non-empty sensor cell that is not numeric.
    #[error("Invalid value {value:?} in column `{column}` at line {line}")]
    InvalidCell {
        line: u64,
        column: String,
        value: String,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SensorError {
    /// `true` for errors raised while loading the initial dataset.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SensorError::FileRead { .. }
                | SensorError::MalformedSource { .. }
                | SensorError::MissingColumn { .. }
                | SensorError::InvalidCell { .. }
        )
    }
}

/// Convenience alias used throughout the sensor crates.
pub type Result<T> = std::result::Result<T, SensorError>;

// ── Validation ─────────────────────────────────────────────────────────────────

/// A single rejected field of a candidate record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Position of the offending record in the submitted batch.
    pub index: usize,
    /// Wire name of the rejected field.
    pub field: RecordField,
    /// What the field was expected to look like.
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.index, self.message)
    }
}

/// A rejected upload batch. Carries every violation found, not only the first.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid sensor data: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// `true` when any violation concerns `field`.
    pub fn names_field(&self, field: RecordField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
