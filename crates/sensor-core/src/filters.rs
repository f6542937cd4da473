//! Date-window and threshold predicates applied when loading readings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, SensorError};

// ── DateWindow ────────────────────────────────────────────────────────────────

/// Inclusive `[min, max]` window over timestamps.
///
/// Both bounds are the midnight starting their date, so a reading later in
/// the day of `max` falls outside, matching ISO-8601 string ordering where
/// `"2018-04-30 10:00:00" > "2018-04-30"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    min: NaiveDate,
    max: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting `min > max`.
    pub fn new(min: NaiveDate, max: NaiveDate) -> Result<Self> {
        if min > max {
            return Err(SensorError::Config(format!(
                "date window is empty: {min} is after {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> NaiveDate {
        self.min
    }

    pub fn max(&self) -> NaiveDate {
        self.max
    }

    /// `true` when `min 00:00:00 <= timestamp <= max 00:00:00`.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.min.and_time(NaiveTime::MIN) <= timestamp
            && timestamp <= self.max.and_time(NaiveTime::MIN)
    }
}

// ── ValueThresholds ───────────────────────────────────────────────────────────

/// Exclusive `(min, max)` range a sensor value must fall strictly inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueThresholds {
    min: f64,
    max: f64,
}

impl ValueThresholds {
    /// Build thresholds, rejecting NaN bounds and `min >= max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(SensorError::Config(format!(
                "value thresholds are empty: ({min}, {max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `true` iff `min < value < max`. NaN is never admitted.
    pub fn admits(&self, value: f64) -> bool {
        self.min < value && value < self.max
    }
}
