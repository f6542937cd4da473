//! One-shot load of the initial record set.

use std::io::Read;

use sensor_core::error::{Result, SensorError};
use sensor_core::models::SensorRecord;
use sensor_core::settings::LoaderConfig;
use tracing::{debug, info};

use crate::reader::RawReadings;
use crate::reshape::reshape;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load, filter and reshape the CSV at `config.source`.
///
/// Any failure is fatal: the caller gets either the full record set or an
/// error, never a partial result.
pub fn load_sensor_records(config: &LoaderConfig) -> Result<Vec<SensorRecord>> {
    let file = std::fs::File::open(&config.source).map_err(|e| SensorError::FileRead {
        path: config.source.clone(),
        source: e,
    })?;
    load_from_reader(std::io::BufReader::new(file), config)
}

/// Same as [`load_sensor_records`] over an already-open reader.
///
/// `config.source` is only used to label errors.
pub fn load_from_reader<R: Read>(reader: R, config: &LoaderConfig) -> Result<Vec<SensorRecord>> {
    let readings = RawReadings::new(reader, &config.source, &config.sensor_columns)?;

    let mut records = Vec::new();
    let mut rows_read = 0u64;
    let mut rows_without_timestamp = 0u64;
    let mut rows_outside_window = 0u64;

    for reading in readings {
        let reading = reading?;
        rows_read += 1;

        let Some(timestamp) = reading.timestamp else {
            rows_without_timestamp += 1;
            continue;
        };
        if !config.date_window.contains(timestamp) {
            rows_outside_window += 1;
            continue;
        }

        records.extend(reshape(
            &reading,
            &config.sensor_columns,
            &config.thresholds,
        ));
    }

    debug!(
        "Source {}: {} rows read, {} without timestamp, {} outside {}..={}",
        config.source.display(),
        rows_read,
        rows_without_timestamp,
        rows_outside_window,
        config.date_window.min(),
        config.date_window.max(),
    );
    info!(
        "Loaded {} sensor records from {}",
        records.len(),
        config.source.display()
    );

    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
