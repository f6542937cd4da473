use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Operational status accepted on the append path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    Normal,
    Recovering,
}

impl MachineStatus {
    /// Every permitted status, in display order.
    pub const ALL: [MachineStatus; 2] = [MachineStatus::Normal, MachineStatus::Recovering];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Normal => "NORMAL",
            MachineStatus::Recovering => "RECOVERING",
        }
    }
}

impl FromStr for MachineStatus {
    type Err = String;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MachineStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown machine status: {s}"))
    }
}

/// Wire names of the [`SensorRecord`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordField {
    Fecha,
    Hora,
    Sensor,
    Medicion,
    Estado,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Fecha => "Fecha",
            RecordField::Hora => "Hora",
            RecordField::Sensor => "Sensor",
            RecordField::Medicion => "Medicion",
            RecordField::Estado => "Estado",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized sensor reading: a single sensor's value at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Calendar date of the reading, serialized as `YYYY-MM-DD`.
    #[serde(rename = "Fecha")]
    pub date: NaiveDate,
    /// Time of day of the reading, serialized as `HH:MM:SS`.
    #[serde(rename = "Hora")]
    pub time: NaiveTime,
    /// Sensor identifier (the source column name for loaded records).
    #[serde(rename = "Sensor")]
    pub sensor: String,
    #[serde(rename = "Medicion")]
    pub measurement: f64,
    /// Machine status. Loaded records carry the source value verbatim.
    #[serde(rename = "Estado")]
    pub status: String,
}

/// An unvalidated record as submitted on the append path.
///
/// Date, time and status stay as text until
/// [`RecordValidator`](crate::validation::RecordValidator) accepts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "Fecha")]
    pub date: String,
    #[serde(rename = "Hora")]
    pub time: String,
    #[serde(rename = "Sensor")]
    pub sensor: String,
    #[serde(rename = "Medicion")]
    pub measurement: f64,
    #[serde(rename = "Estado")]
    pub status: String,
}
