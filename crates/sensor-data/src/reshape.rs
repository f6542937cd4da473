//! Wide-to-long reshape of a single [`RawReading`].

use sensor_core::filters::ValueThresholds;
use sensor_core::models::SensorRecord;

use crate::reader::RawReading;

/// Split one reading into one record per sensor whose value is present and
/// strictly inside `thresholds`.
///
/// `sensor_columns` must be aligned with `reading.values`. Records come out in
/// column order. A reading without a timestamp yields nothing.
pub fn reshape(
    reading: &RawReading,
    sensor_columns: &[String],
    thresholds: &ValueThresholds,
) -> Vec<SensorRecord> {
    let Some(timestamp) = reading.timestamp else {
        return Vec::new();
    };

    sensor_columns
        .iter()
        .zip(&reading.values)
        .filter_map(|(sensor, value)| {
            let measurement = (*value)?;
            thresholds.admits(measurement).then(|| SensorRecord {
                date: timestamp.date(),
                time: timestamp.time(),
                sensor: sensor.clone(),
                measurement,
                status: reading.status.clone(),
            })
        })
        .collect()
}
