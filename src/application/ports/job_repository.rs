use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{JobGuard, JobId, JobPatch, JobStatus, TranslationJob};

use super::RepositoryError;

/// Persistence port for translation jobs. Every mutation is a single atomic
/// operation scoped to one job id.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError>;

    /// Jobs ordered by priority (highest first), then creation time (oldest
    /// first). `None` lists every status.
    async fn list_by_status(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<TranslationJob>, RepositoryError>;

    /// Compare-and-swap `pending -> processing`. Returns `false` when the job
    /// is gone or another worker got there first.
    async fn claim(
        &self,
        id: JobId,
        worker_id: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError>;

    /// Unconditional update. Returns the updated job, or `None` if it does not exist.
    async fn update(
        &self,
        id: JobId,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError>;

    /// Update applied only while the stored job still matches `guard`.
    /// Returns `None` when the job is missing or the guard no longer holds.
    async fn transition(
        &self,
        id: JobId,
        guard: &JobGuard,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError>;

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError>;

    async fn count_by_status(&self) -> Result<JobStats, RepositoryError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl JobStats {
    pub fn record(&mut self, status: JobStatus, count: i64) {
        match status {
            JobStatus::Pending => self.pending += count,
            JobStatus::Processing => self.processing += count,
            JobStatus::Completed => self.completed += count,
            JobStatus::Failed => self.failed += count,
            JobStatus::Cancelled => self.cancelled += count,
        }
        self.total += count;
    }
}
