use std::sync::Arc;

use tracing::instrument;

use crate::application::ports::JobRepository;
use crate::domain::{JobGuard, JobId, JobPatch, JobStatus, TranslationJob};

use super::JobError;

const MAX_CANCEL_ATTEMPTS: usize = 5;

/// Retry and cancel transitions. Neither runs a job; they only move it to a
/// state the scheduler or a running worker will act on.
pub struct RetryManager {
    job_repository: Arc<dyn JobRepository>,
}

impl RetryManager {
    pub fn new(job_repository: Arc<dyn JobRepository>) -> Self {
        Self { job_repository }
    }

    #[instrument(skip(self), fields(job_id = %id))]
    pub async fn retry(&self, id: JobId) -> Result<TranslationJob, JobError> {
        let job = self.load(id).await?;

        if job.status != JobStatus::Failed {
            return Err(JobError::InvalidState {
                id,
                status: job.status,
                operation: "retry",
            });
        }
        if !job.can_retry() {
            return Err(JobError::RetryBudgetExceeded {
                id,
                retry_count: job.retry_count,
                max_retries: job.max_retries,
            });
        }

        // Racing retries read the same count; only one may increment it.
        let guard = JobGuard::status(JobStatus::Failed).with_retry_count(job.retry_count);
        let patch = JobPatch::requeued(job.retry_count + 1);
        match self.job_repository.transition(id, &guard, &patch).await? {
            Some(requeued) => {
                tracing::info!(
                    retry_count = requeued.retry_count,
                    max_retries = requeued.max_retries,
                    "Job requeued for retry"
                );
                Ok(requeued)
            }
            None => {
                let current = self.load(id).await?;
                Err(JobError::InvalidState {
                    id,
                    status: current.status,
                    operation: "retry",
                })
            }
        }
    }

    /// Cancels from any status except `completed`. A processing job is
    /// flipped here and its worker notices between tasks.
    #[instrument(skip(self), fields(job_id = %id))]
    pub async fn cancel(&self, id: JobId) -> Result<TranslationJob, JobError> {
        let mut observed = self.load(id).await?;

        for _ in 0..MAX_CANCEL_ATTEMPTS {
            if observed.status == JobStatus::Completed {
                return Err(JobError::InvalidState {
                    id,
                    status: observed.status,
                    operation: "cancel",
                });
            }

            if let Some(cancelled) = self
                .job_repository
                .transition(id, &JobGuard::status(observed.status), &JobPatch::cancelled())
                .await?
            {
                tracing::info!(previous_status = %observed.status, "Job cancelled");
                return Ok(cancelled);
            }

            observed = self.load(id).await?;
        }

        tracing::warn!(status = %observed.status, "Job kept changing status during cancel");
        Err(JobError::InvalidState {
            id,
            status: observed.status,
            operation: "cancel",
        })
    }

    async fn load(&self, id: JobId) -> Result<TranslationJob, JobError> {
        self.job_repository
            .get_by_id(id)
            .await?
            .ok_or(JobError::NotFound(id))
    }
}
