//! Validation of records submitted on the append path.
//!
//! By default only the format of `Fecha`/`Hora` and membership of `Estado` in
//! [`MachineStatus`] are checked. The sensor identifier is free text and the
//! measurement is not range-checked, unlike records produced by the loader.
//! [`AppendPolicy::Strict`] adds the loader's sensor-set and threshold rules;
//! the loader's date window is never applied to uploads.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{FieldViolation, ValidationError};
use crate::filters::ValueThresholds;
use crate::models::{CandidateRecord, MachineStatus, RecordField, SensorRecord};

/// `strftime` pattern for the `Fecha` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `strftime` pattern for the `Hora` field.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Which rules an uploaded record must satisfy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AppendPolicy {
    /// Format and status checks only.
    #[default]
    Lenient,
    /// Format and status checks plus the configured sensor set and thresholds.
    Strict {
        sensors: Vec<String>,
        thresholds: ValueThresholds,
    },
}

/// Turns [`CandidateRecord`]s into [`SensorRecord`]s or explains why not.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    policy: AppendPolicy,
}

impl RecordValidator {
    pub fn new(policy: AppendPolicy) -> Self {
        Self { policy }
    }

    /// Validate a single candidate located at `index` within its batch.
    ///
    /// Every failing field is reported, not only the first.
    pub fn validate_record(
        &self,
        index: usize,
        candidate: &CandidateRecord,
    ) -> Result<SensorRecord, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let mut reject = |field: RecordField, message: String| {
            violations.push(FieldViolation {
                index,
                field,
                message,
            });
        };

        let date = numeric_shape(&candidate.date, '-')
            .then(|| NaiveDate::parse_from_str(&candidate.date, DATE_FORMAT).ok())
            .flatten();
        if date.is_none() {
            reject(
                RecordField::Fecha,
                "Fecha debe estar en formato 'YYYY-MM-DD'".to_string(),
            );
        }

        let time = numeric_shape(&candidate.time, ':')
            .then(|| NaiveTime::parse_from_str(&candidate.time, TIME_FORMAT).ok())
            .flatten();
        if time.is_none() {
            reject(
                RecordField::Hora,
                "Hora debe estar en formato 'HH:MM:SS'".to_string(),
            );
        }

        if candidate.status.parse::<MachineStatus>().is_err() {
            reject(
                RecordField::Estado,
                "Estado debe ser 'NORMAL' o 'RECOVERING'".to_string(),
            );
        }

        if let AppendPolicy::Strict {
            sensors,
            thresholds,
        } = &self.policy
        {
            if !sensors.iter().any(|s| *s == candidate.sensor) {
                reject(
                    RecordField::Sensor,
                    format!("Sensor debe ser uno de: {}", sensors.join(", ")),
                );
            }
            if !thresholds.admits(candidate.measurement) {
                reject(
                    RecordField::Medicion,
                    format!(
                        "Medicion debe estar estrictamente entre {} y {}",
                        thresholds.min(),
                        thresholds.max()
                    ),
                );
            }
        }

        match (date, time) {
            (Some(date), Some(time)) if violations.is_empty() => Ok(SensorRecord {
                date,
                time,
                sensor: candidate.sensor.clone(),
                measurement: candidate.measurement,
                status: candidate.status.clone(),
            }),
            _ => Err(violations),
        }
    }

    /// Validate a whole batch. Any violation rejects the batch.
    pub fn validate_batch(
        &self,
        candidates: &[CandidateRecord],
    ) -> Result<Vec<SensorRecord>, ValidationError> {
        let mut records = Vec::with_capacity(candidates.len());
        let mut violations = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.validate_record(index, candidate) {
                Ok(record) => records.push(record),
                Err(errs) => violations.extend(errs),
            }
        }

        if violations.is_empty() {
            Ok(records)
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

/// Only ASCII digits and `separator`, starting with a digit.
///
/// `chrono` skips surrounding whitespace and takes a leading sign on years,
/// so `" 2018-04-05"` or `"+2018-04-05"` would otherwise parse.
fn numeric_shape(value: &str, separator: char) -> bool {
    value.starts_with(|c: char| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_digit() || c == separator)
}
