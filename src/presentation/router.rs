use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::TranslationProvider;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    cancel_job_handler, claim_job_handler, delete_job_handler, enqueue_job_handler,
    get_job_handler, health_handler, job_stats_handler, list_jobs_handler, retry_job_handler,
    translate_article_handler, update_job_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: TranslationProvider + ?Sized + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler::<P>))
        .route(
            "/api/v1/jobs",
            post(enqueue_job_handler::<P>).get(list_jobs_handler::<P>),
        )
        .route("/api/v1/jobs/stats", get(job_stats_handler::<P>))
        .route("/api/v1/jobs/claim", post(claim_job_handler::<P>))
        .route(
            "/api/v1/jobs/{job_id}",
            get(get_job_handler::<P>)
                .patch(update_job_handler::<P>)
                .delete(delete_job_handler::<P>),
        )
        .route("/api/v1/jobs/{job_id}/cancel", post(cancel_job_handler::<P>))
        .route("/api/v1/jobs/{job_id}/retry", post(retry_job_handler::<P>))
        .route(
            "/api/v1/translate/article",
            post(translate_article_handler::<P>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
