use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::application::ports::{JobRepository, JobStats, RepositoryError};
use crate::domain::{JobGuard, JobId, JobPatch, JobStatus, TranslationJob};

/// Process-local job store. The single lock makes every operation atomic,
/// which is all the claim protocol needs.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, TranslationJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError> {
        Ok(self.jobs.lock().await.get(&id).cloned())
    }

    async fn list_by_status(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<TranslationJob>, RepositoryError> {
        let jobs = self.jobs.lock().await;
        let mut listed: Vec<TranslationJob> = jobs
            .values()
            .filter(|job| status.is_none_or(|s| job.status == s))
            .cloned()
            .collect();
        listed.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(listed)
    }

    async fn claim(
        &self,
        id: JobId,
        worker_id: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        let mut jobs = self.jobs.lock().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.apply(&JobPatch::claimed(worker_id, Utc::now(), estimated_completion));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update(
        &self,
        id: JobId,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        let mut jobs = self.jobs.lock().await;
        Ok(jobs.get_mut(&id).map(|job| {
            job.apply(patch);
            job.clone()
        }))
    }

    async fn transition(
        &self,
        id: JobId,
        guard: &JobGuard,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        let mut jobs = self.jobs.lock().await;
        match jobs.get_mut(&id) {
            Some(job) if guard.matches(job) => {
                job.apply(patch);
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        Ok(self.jobs.lock().await.remove(&id).is_some())
    }

    async fn count_by_status(&self) -> Result<JobStats, RepositoryError> {
        let jobs = self.jobs.lock().await;
        let mut stats = JobStats::default();
        for job in jobs.values() {
            stats.record(job.status, 1);
        }
        Ok(stats)
    }
}
