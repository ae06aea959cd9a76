use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::TranslationProvider;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub translation_backend: &'static str,
}

/// Liveness of the service itself; a down backend degrades the report but
/// still answers 200 so jobs can keep being enqueued.
pub async fn health_handler<P>(State(state): State<AppState<P>>) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let (status, translation_backend) = match state.provider.health_check().await {
        Ok(()) => ("healthy", "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Translation backend health check failed");
            ("degraded", "unavailable")
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            translation_backend,
        }),
    )
}
