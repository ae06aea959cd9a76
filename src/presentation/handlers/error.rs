use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::JobError;
use crate::domain::JobId;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

pub fn job_error_response(error: JobError) -> Response {
    let status = match &error {
        JobError::Validation(_) => StatusCode::BAD_REQUEST,
        JobError::NotFound(_) => StatusCode::NOT_FOUND,
        JobError::InvalidState { .. } | JobError::RetryBudgetExceeded { .. } => {
            StatusCode::CONFLICT
        }
        JobError::Repository(e) => {
            tracing::error!(error = %e, "Job store operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, error.to_string())
}

pub fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    Uuid::parse_str(raw)
        .map(JobId::from_uuid)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", raw)))
}
