//! CSV parsing into [`RawReading`]s.
//!
//! The source is a wide table: one `timestamp` column, one `machine_status`
//! column and one numeric column per sensor. Only the configured sensor
//! columns are read; any other column is ignored.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use sensor_core::error::{Result, SensorError};
use tracing::debug;

/// Header of the timestamp column.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Header of the machine status column.
pub const STATUS_COLUMN: &str = "machine_status";

/// Cell spellings treated as a missing value.
const NULL_MARKERS: &[&str] = &[
    "", "nan", "NaN", "-nan", "-NaN", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "None", "<NA>",
];

// ── RawReading ────────────────────────────────────────────────────────────────

/// One source row before reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// `None` when the cell is empty or not a recognised timestamp.
    pub timestamp: Option<NaiveDateTime>,
    /// Machine status exactly as written in the source.
    pub status: String,
    /// Sensor values, positionally aligned with the configured sensor columns.
    pub values: Vec<Option<f64>>,
}

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses the timestamp spellings found in sensor exports.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp cell, keeping the wall-clock reading as written.
    ///
    /// Handles RFC 3339 (the offset is dropped, not applied), ISO 8601 with a
    /// `T` or space separator, optional fractional seconds, minute precision
    /// and bare dates (read as midnight). Returns `None` for null markers and
    /// anything unrecognised.
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if NULL_MARKERS.contains(&s) {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ];
        for fmt in FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

// ── ColumnLayout ──────────────────────────────────────────────────────────────

/// Positions of the columns the loader reads, resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    timestamp: usize,
    status: usize,
    sensors: Vec<(String, usize)>,
}

impl ColumnLayout {
    /// Locate the required columns in `headers`.
    ///
    /// Fails with [`SensorError::MissingColumn`] naming the first absent column.
    pub fn resolve(headers: &StringRecord, sensor_columns: &[String], source: &Path) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SensorError::MissingColumn {
                    path: source.to_path_buf(),
                    column: name.to_string(),
                })
        };

        let timestamp = find(TIMESTAMP_COLUMN)?;
        let status = find(STATUS_COLUMN)?;
        let sensors = sensor_columns
            .iter()
            .map(|name| find(name).map(|idx| (name.clone(), idx)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            timestamp,
            status,
            sensors,
        })
    }

    /// Convert one CSV record. `line` is only used for error reporting.
    pub fn read_row(&self, record: &StringRecord, line: u64) -> Result<RawReading> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let values = self
            .sensors
            .iter()
            .map(|(name, idx)| parse_cell(cell(*idx), name, line))
            .collect::<Result<Vec<_>>>()?;

        Ok(RawReading {
            timestamp: TimestampParser::parse(cell(self.timestamp)),
            status: cell(self.status).to_string(),
            values,
        })
    }
}

/// Parse a sensor cell: null markers become `None`, numbers `Some`, the rest fail.
fn parse_cell(raw: &str, column: &str, line: u64) -> Result<Option<f64>> {
    let raw = raw.trim();
    if NULL_MARKERS.contains(&raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(SensorError::InvalidCell {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

// ── RawReadings ───────────────────────────────────────────────────────────────

/// Streaming iterator of [`RawReading`]s over a CSV source.
pub struct RawReadings<R: Read> {
    source: PathBuf,
    layout: ColumnLayout,
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> RawReadings<R> {
    /// Read the header row of `reader` and resolve `sensor_columns` against it.
    ///
    /// `source` labels errors; nothing is opened through it.
    pub fn new(reader: R, source: &Path, sensor_columns: &[String]) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| malformed(source, e))?
            .clone();
        let layout = ColumnLayout::resolve(&headers, sensor_columns, source)?;
        debug!(
            "Resolved {} sensor columns in {}",
            sensor_columns.len(),
            source.display()
        );

        Ok(Self {
            source: source.to_path_buf(),
            layout,
            records: csv_reader.into_records(),
        })
    }
}

impl<R: Read> Iterator for RawReadings<R> {
    type Item = Result<RawReading>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(malformed(&self.source, e))),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Some(self.layout.read_row(&record, line))
    }
}

fn malformed(source: &Path, e: csv::Error) -> SensorError {
    SensorError::MalformedSource {
        path: source.to_path_buf(),
        source: Box::new(e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn read_all(csv: &str, sensors: &[&str]) -> Result<Vec<RawReading>> {
        RawReadings::new(csv.as_bytes(), Path::new("test.csv"), &columns(sensors))?.collect()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    // ── TimestampParser ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_space_separated() {
        assert_eq!(
            TimestampParser::parse("2018-04-05 10:00:00"),
            Some(ts("2018-04-05 10:00:00"))
        );
    }

    #[test]
    fn test_parse_iso_t_separator() {
        assert_eq!(
            TimestampParser::parse("2018-04-05T10:00:00"),
            Some(ts("2018-04-05 10:00:00"))
        );
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        assert_eq!(
            TimestampParser::parse("2018-04-05T10:00:00+02:00"),
            Some(ts("2018-04-05 10:00:00"))
        );
        assert_eq!(
            TimestampParser::parse("2018-04-05T10:00:00Z"),
            Some(ts("2018-04-05 10:00:00"))
        );
    }

    #[test]
    fn test_parse_minute_precision_and_bare_date() {
        assert_eq!(
            TimestampParser::parse("2018-04-05 10:30"),
            Some(ts("2018-04-05 10:30:00"))
        );
        assert_eq!(
            TimestampParser::parse("2018-04-05"),
            Some(ts("2018-04-05 00:00:00"))
        );
    }

    #[test]
    fn test_parse_null_and_garbage() {
        assert_eq!(TimestampParser::parse(""), None);
        assert_eq!(TimestampParser::parse("NaN"), None);
        assert_eq!(TimestampParser::parse("yesterday"), None);
        assert_eq!(TimestampParser::parse("2018-13-01 00:00:00"), None);
    }

    // ── RawReadings ───────────────────────────────────────────────────────────

    #[test]
    fn test_reads_configured_columns_in_order() {
        let csv = "\
,timestamp,sensor_00,sensor_07,sensor_47,machine_status
0,2018-04-05 10:00:00,1.5,25.0,22.5,NORMAL
";
        let rows = read_all(csv, &["sensor_47", "sensor_07"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, Some(ts("2018-04-05 10:00:00")));
        assert_eq!(rows[0].status, "NORMAL");
        assert_eq!(rows[0].values, vec![Some(22.5), Some(25.0)]);
    }

    #[test]
    fn test_status_kept_verbatim_while_values_are_trimmed() {
        let csv = "timestamp , sensor_07 ,machine_status\n 2018-04-05 10:00:00 , 25.0 , NORMAL \n";
        let rows = read_all(csv, &["sensor_07"]).unwrap();
        assert_eq!(rows[0].timestamp, Some(ts("2018-04-05 10:00:00")));
        assert_eq!(rows[0].values, vec![Some(25.0)]);
        assert_eq!(rows[0].status, " NORMAL ");
    }

    #[test]
    fn test_empty_and_nan_cells_are_null() {
        let csv = "\
timestamp,sensor_07,sensor_47,machine_status
2018-04-05 10:00:00,,NaN,RECOVERING
";
        let rows = read_all(csv, &["sensor_07", "sensor_47"]).unwrap();
        assert_eq!(rows[0].values, vec![None, None]);
        assert_eq!(rows[0].status, "RECOVERING");
    }

    #[test]
    fn test_missing_timestamp_cell_is_none() {
        let csv = "\
timestamp,sensor_07,machine_status
,25.0,NORMAL
";
        let rows = read_all(csv, &["sensor_07"]).unwrap();
        assert_eq!(rows[0].timestamp, None);
        assert_eq!(rows[0].values, vec![Some(25.0)]);
    }

    #[test]
    fn test_missing_sensor_column_is_error() {
        let csv = "timestamp,sensor_07,machine_status\n";
        let err = read_all(csv, &["sensor_07", "sensor_47"]).unwrap_err();
        match err {
            SensorError::MissingColumn { column, path } => {
                assert_eq!(column, "sensor_47");
                assert_eq!(path, PathBuf::from("test.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_status_column_is_error() {
        let csv = "timestamp,sensor_07\n";
        let err = read_all(csv, &["sensor_07"]).unwrap_err();
        assert!(matches!(
            err,
            SensorError::MissingColumn { ref column, .. } if column == STATUS_COLUMN
        ));
    }

    #[test]
    fn test_non_numeric_cell_is_error() {
        let csv = "\
timestamp,sensor_07,machine_status
2018-04-05 10:00:00,25.0,NORMAL
2018-04-05 10:01:00,broken,NORMAL
";
        let err = read_all(csv, &["sensor_07"]).unwrap_err();
        match err {
            SensorError::InvalidCell {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "sensor_07");
                assert_eq!(value, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let csv = "\
timestamp,sensor_07,machine_status
2018-04-05 10:00:00,25.0
";
        let err = read_all(csv, &["sensor_07"]).unwrap_err();
        assert!(matches!(err, SensorError::MalformedSource { .. }));
        assert!(err.is_load_error());
    }
}
