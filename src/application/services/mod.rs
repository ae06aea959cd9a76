mod article_translator;
mod job_error;
mod job_scheduler;
mod job_service;
mod progress_tracker;
mod retry_manager;
mod translation_orchestrator;
mod translation_worker;

pub use article_translator::{
    ArticleTranslation, ArticleTranslationRequest, ArticleTranslationStatus, ArticleTranslator,
    FieldTranslation,
};
pub use job_error::JobError;
pub use job_scheduler::{ClaimFilter, JobScheduler};
pub use job_service::{EnqueueJobRequest, JobService, JobUpdate, MAX_RETRIES_LIMIT};
pub use progress_tracker::{PhaseWeights, ProgressTracker, compute_progress};
pub use retry_manager::RetryManager;
pub use translation_orchestrator::{
    BatchOutcome, CLOSING_LINE, DEFAULT_NEWSLETTER_TITLE, OrchestrationError, OrchestratorSettings,
    READ_MORE_LABEL, TranslationOrchestrator,
};
pub use translation_worker::{TranslationWorker, WorkerError};
