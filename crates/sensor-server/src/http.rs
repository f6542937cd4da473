//! HTTP endpoints for the sensor server using axum.
//!
//! Endpoints:
//! - GET  /api/sensors         - every stored record
//! - POST /api/sensors/upload  - validate and append a batch of records
//! - GET  /api/health          - liveness and record count

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use sensor_core::models::{CandidateRecord, SensorRecord};
use sensor_runtime::ingest::IngestService;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Confirmation returned by a successful upload.
pub const UPLOAD_CONFIRMATION: &str = "Sensor data was successfully added";

/// Build the axum router over a shared [`IngestService`].
pub fn router(service: IngestService) -> Router {
    Router::new()
        .route("/api/sensors", get(get_sensors))
        .route("/api/sensors/upload", post(upload_sensors))
        .route("/api/health", get(health))
        .with_state(service)
}

// ── Request / Response types ────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
}

// ── Handlers ────────────────────────────────────────────────────────

async fn get_sensors(State(service): State<IngestService>) -> Json<Vec<SensorRecord>> {
    Json(service.records())
}

async fn upload_sensors(
    State(service): State<IngestService>,
    payload: Result<Json<Vec<CandidateRecord>>, JsonRejection>,
) -> Result<Json<UploadResponse>, ServerError> {
    let Json(batch) = payload?;
    service.upload(&batch)?;
    Ok(Json(UploadResponse {
        message: UPLOAD_CONFIRMATION.to_string(),
    }))
}

async fn health(State(service): State<IngestService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        records: service.store().len(),
    })
}

// ── Tests ───────────────────────────────────────────────────────────
