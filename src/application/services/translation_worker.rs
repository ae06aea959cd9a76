use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::Instrument;

use crate::application::ports::{JobRepository, RepositoryError, TranslationProvider};
use crate::domain::{JobGuard, JobPatch, TranslationJob};

use super::{JobError, JobScheduler, OrchestrationError, TranslationOrchestrator};

/// Polls the scheduler and runs whatever it claims. Workers share nothing but
/// the job store, so any number of them can run side by side.
pub struct TranslationWorker<P: TranslationProvider + ?Sized> {
    worker_id: String,
    scheduler: Arc<JobScheduler>,
    orchestrator: Arc<TranslationOrchestrator<P>>,
    job_repository: Arc<dyn JobRepository>,
    poll_interval: Duration,
}

impl<P: TranslationProvider + ?Sized + 'static> TranslationWorker<P> {
    pub fn new(
        worker_id: impl Into<String>,
        scheduler: Arc<JobScheduler>,
        orchestrator: Arc<TranslationOrchestrator<P>>,
        job_repository: Arc<dyn JobRepository>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            scheduler,
            orchestrator,
            job_repository,
            poll_interval,
        }
    }

    /// Runs until `shutdown` turns true. An in-flight job is finished first.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(worker_id = %self.worker_id, "Translation worker started");

        while !*shutdown.borrow() {
            match self.process_next().await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        worker_id = %self.worker_id,
                        error = %e,
                        "Worker iteration failed"
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
        }

        tracing::info!(worker_id = %self.worker_id, "Translation worker stopped");
    }

    /// Claims and runs one job. Returns `false` when nothing was claimable.
    pub async fn process_next(&self) -> Result<bool, WorkerError> {
        let Some(job) = self.scheduler.claim_next(&self.worker_id, None).await? else {
            return Ok(false);
        };

        let span = tracing::info_span!(
            "translation_job",
            job_id = %job.id,
            worker_id = %self.worker_id,
            attempt = job.retry_count + 1,
        );
        self.process_job(job).instrument(span).await?;
        Ok(true)
    }

    async fn process_job(&self, job: TranslationJob) -> Result<(), WorkerError> {
        let owned = JobGuard::owned_by(self.worker_id.as_str());
        tracing::info!(
            articles = job.original_articles.len(),
            languages = job.target_languages.len(),
            "Translation job started"
        );

        match self.orchestrator.run(&job).await {
            Ok(outcome) => {
                let patch = JobPatch::completed(
                    outcome.translated_content,
                    outcome.translated_articles,
                    Utc::now(),
                );
                match self.job_repository.transition(job.id, &owned, &patch).await? {
                    Some(_) => tracing::info!("Translation job completed"),
                    None => tracing::info!("Job no longer ours, results discarded"),
                }
            }
            Err(OrchestrationError::Cancelled) => {
                tracing::info!("Job cancelled mid-run, partial results discarded");
            }
            Err(e) => {
                let error_message = e.to_string();
                tracing::warn!(error = %error_message, "Translation job failed");
                if self
                    .job_repository
                    .transition(job.id, &owned, &JobPatch::failed(error_message))
                    .await?
                    .is_none()
                {
                    tracing::info!("Job no longer ours, failure not recorded");
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("scheduling: {0}")]
    Scheduling(#[from] JobError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
