//! Runtime state for the sensor readings service.
//!
//! Owns the in-memory [`store::RecordStore`] and the ingest boundary that
//! validates uploaded batches before merging them into it.

pub mod ingest;
pub mod store;

pub use sensor_core as core;
pub use sensor_data as data;
