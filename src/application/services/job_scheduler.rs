use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::application::ports::JobRepository;
use crate::domain::{JobPriority, JobStatus, Language, TranslationJob};

use super::JobError;

/// Optional narrowing of which pending jobs a worker is willing to take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub min_priority: Option<JobPriority>,
    pub language: Option<Language>,
}

impl ClaimFilter {
    pub fn matches(&self, job: &TranslationJob) -> bool {
        let priority_ok = self.min_priority.is_none_or(|min| job.priority >= min);
        let language_ok = self
            .language
            .is_none_or(|lang| job.target_languages.contains(&lang));
        priority_ok && language_ok
    }
}

pub struct JobScheduler {
    job_repository: Arc<dyn JobRepository>,
    seconds_per_task: u32,
}

impl JobScheduler {
    pub fn new(job_repository: Arc<dyn JobRepository>, seconds_per_task: u32) -> Self {
        Self {
            job_repository,
            seconds_per_task,
        }
    }

    /// Claims the highest-priority, oldest pending job that passes `filter`.
    /// Losing a claim race is not an error: the next candidate is tried, and
    /// `None` means nothing was claimable.
    #[instrument(skip(self, filter), fields(worker_id = %worker_id))]
    pub async fn claim_next(
        &self,
        worker_id: &str,
        filter: Option<&ClaimFilter>,
    ) -> Result<Option<TranslationJob>, JobError> {
        if worker_id.trim().is_empty() {
            return Err(JobError::Validation("worker id must not be empty".to_string()));
        }

        let mut candidates = self
            .job_repository
            .list_by_status(Some(JobStatus::Pending))
            .await?;
        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });

        for candidate in candidates
            .into_iter()
            .filter(|job| filter.is_none_or(|f| f.matches(job)))
        {
            let eta = self.estimate_completion(&candidate, Utc::now());
            if !self
                .job_repository
                .claim(candidate.id, worker_id, Some(eta))
                .await?
            {
                tracing::debug!(job_id = %candidate.id, "Lost claim race, trying next candidate");
                continue;
            }

            tracing::info!(
                job_id = %candidate.id,
                priority = %candidate.priority,
                "Job claimed"
            );
            // Deleted or handed on between claim and read: nothing left to work on.
            if let Some(job) = self
                .job_repository
                .get_by_id(candidate.id)
                .await?
                .filter(|job| job.assigned_worker.as_deref() == Some(worker_id))
            {
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    pub fn estimate_completion(&self, job: &TranslationJob, from: DateTime<Utc>) -> DateTime<Utc> {
        let tasks = job.translation_task_count() + job.target_languages.len();
        from + Duration::seconds(tasks as i64 * i64::from(self.seconds_per_task))
    }
}
