use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{JobRepository, JobStats, RepositoryError};
use crate::domain::{JobGuard, JobId, JobPatch, JobStatus, TranslationJob};

/// Bounds every store call with the same deadline.
pub struct TimeoutJobRepository {
    inner: Arc<dyn JobRepository>,
    timeout: Duration,
}

impl TimeoutJobRepository {
    pub fn new(inner: Arc<dyn JobRepository>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, RepositoryError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(RepositoryError::Timeout(format!(
                    "{} exceeded {}ms",
                    operation,
                    self.timeout.as_millis()
                )))
            })
    }
}

#[async_trait]
impl JobRepository for TimeoutJobRepository {
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError> {
        self.bounded("create", self.inner.create(job)).await
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError> {
        self.bounded("get_by_id", self.inner.get_by_id(id)).await
    }

    async fn list_by_status(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<TranslationJob>, RepositoryError> {
        self.bounded("list_by_status", self.inner.list_by_status(status))
            .await
    }

    async fn claim(
        &self,
        id: JobId,
        worker_id: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        self.bounded(
            "claim",
            self.inner.claim(id, worker_id, estimated_completion),
        )
        .await
    }

    async fn update(
        &self,
        id: JobId,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.bounded("update", self.inner.update(id, patch)).await
    }

    async fn transition(
        &self,
        id: JobId,
        guard: &JobGuard,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.bounded("transition", self.inner.transition(id, guard, patch))
            .await
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        self.bounded("delete", self.inner.delete(id)).await
    }

    async fn count_by_status(&self) -> Result<JobStats, RepositoryError> {
        self.bounded("count_by_status", self.inner.count_by_status())
            .await
    }
}
