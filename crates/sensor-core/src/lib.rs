//! Core types shared by the sensor readings service.
//!
//! Holds the normalized [`models::SensorRecord`] format, the date-window and
//! threshold filters, the append-path validation rules, configuration and the
//! crate-wide error type.

pub mod error;
pub mod filters;
pub mod models;
pub mod settings;
pub mod validation;
