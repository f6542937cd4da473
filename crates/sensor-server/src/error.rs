//! Error responses for the HTTP layer.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sensor_core::error::{FieldViolation, ValidationError};
use serde::Serialize;

/// Application-level error type.
#[derive(Debug)]
pub enum ServerError {
    /// One or more uploaded records failed validation.
    Validation(ValidationError),
    /// The request body is not a JSON list of sensor records.
    Payload(JsonRejection),
}

/// JSON body returned on error.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<FieldViolation>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error, violations) = match self {
            ServerError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                err.to_string(),
                err.violations,
            ),
            ServerError::Payload(rejection) => (rejection.status(), rejection.body_text(), Vec::new()),
        };

        let body = ErrorBody {
            error,
            code: status.as_u16(),
            violations,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        ServerError::Validation(e)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(e: JsonRejection) -> Self {
        ServerError::Payload(e)
    }
}
