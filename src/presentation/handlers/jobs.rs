use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::application::ports::TranslationProvider;
use crate::application::services::{ClaimFilter, EnqueueJobRequest, JobUpdate};
use crate::domain::{JobPriority, JobStatus, Language};
use crate::presentation::state::AppState;

use super::error::{error_response, job_error_response, parse_job_id};

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimJobRequest {
    pub worker_id: String,
    #[serde(default)]
    pub min_priority: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[tracing::instrument(skip(state, request))]
pub async fn enqueue_job_handler<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<EnqueueJobRequest>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    match state.job_service.enqueue(request).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_jobs_handler<P>(
    State(state): State<AppState<P>>,
    Query(query): Query<ListJobsQuery>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let status = match query.status.as_deref().map(str::parse::<JobStatus>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.job_service.list(status).await {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(e) => job_error_response(e),
    }
}

pub async fn job_stats_handler<P>(State(state): State<AppState<P>>) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    match state.job_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.get(id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state, update))]
pub async fn update_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.update(id, update).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn cancel_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.retry_manager.cancel(id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => job_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn retry_job_handler<P>(
    State(state): State<AppState<P>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.retry_manager.retry(id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => job_error_response(e),
    }
}

/// Lets an out-of-process worker take the next job. 204 when nothing matches.
#[tracing::instrument(skip(state, request), fields(worker_id = %request.worker_id))]
pub async fn claim_job_handler<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<ClaimJobRequest>,
) -> impl IntoResponse
where
    P: TranslationProvider + ?Sized + 'static,
{
    let filter = match claim_filter(&request) {
        Ok(filter) => filter,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state
        .scheduler
        .claim_next(&request.worker_id, Some(&filter))
        .await
    {
        Ok(Some(job)) => (StatusCode::OK, Json(job)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => job_error_response(e),
    }
}

fn claim_filter(request: &ClaimJobRequest) -> Result<ClaimFilter, String> {
    Ok(ClaimFilter {
        min_priority: request
            .min_priority
            .as_deref()
            .map(str::parse::<JobPriority>)
            .transpose()?,
        language: request
            .language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()?,
    })
}
