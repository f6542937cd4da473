//! Source loading for the sensor readings service.
//!
//! Reads the raw CSV export, keeps the rows inside the configured date
//! window and reshapes every row into one record per in-threshold sensor.

pub mod loader;
pub mod reader;
pub mod reshape;

pub use sensor_core as core;
