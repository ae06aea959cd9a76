use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use globalnews::application::ports::{JobRepository, JobStats, RepositoryError};
use globalnews::application::services::{JobError, RetryManager};
use globalnews::domain::{
    JobGuard, JobId, JobPatch, JobPriority, JobStatus, Language, TranslationJob,
};
use globalnews::infrastructure::persistence::InMemoryJobRepository;

use crate::support::{hello_article, new_job, store_processing};

async fn failed_job(repository: &Arc<dyn JobRepository>, retry_count: u32) -> JobId {
    let mut job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    job.retry_count = retry_count;
    let job = store_processing(repository.as_ref(), &job).await;
    repository
        .transition(job.id, &JobGuard::status(JobStatus::Processing), &JobPatch::failed("boom"))
        .await
        .unwrap()
        .expect("fail transition refused");
    job.id
}

#[tokio::test]
async fn given_failed_job_with_budget_when_retrying_then_requeued_and_counted() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let id = failed_job(&repository, 0).await;

    let job = manager.retry(id).await.unwrap();

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.retry_count, 1);
    assert_eq!(job.progress, 0);
    assert!(job.error_message.is_none());
    assert!(job.assigned_worker.is_none());
}

#[tokio::test]
async fn given_exhausted_budget_when_retrying_then_rejected_and_job_unchanged() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let id = failed_job(&repository, 3).await;

    let result = manager.retry(id).await;

    assert!(matches!(
        result,
        Err(JobError::RetryBudgetExceeded {
            retry_count: 3,
            max_retries: 3,
            ..
        })
    ));
    let stored = repository.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.retry_count, 3);
}

#[tokio::test]
async fn given_pending_job_when_retrying_then_invalid_state() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();

    let result = manager.retry(job.id).await;

    assert!(matches!(
        result,
        Err(JobError::InvalidState {
            status: JobStatus::Pending,
            ..
        })
    ));
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored, job);
}

#[tokio::test]
async fn given_completed_job_when_retrying_then_invalid_state_and_job_unchanged() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    let job = store_processing(repository.as_ref(), &job).await;
    let completed = repository
        .transition(
            job.id,
            &JobGuard::status(JobStatus::Processing),
            &JobPatch::completed(Default::default(), Default::default(), Utc::now()),
        )
        .await
        .unwrap()
        .expect("complete transition refused");

    let result = manager.retry(job.id).await;

    assert!(matches!(
        result,
        Err(JobError::InvalidState {
            status: JobStatus::Completed,
            ..
        })
    ));
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored, completed);
}

/// Serves one stale snapshot of the job to the first read, then delegates.
struct StaleReadRepository {
    inner: Arc<dyn JobRepository>,
    snapshot: Mutex<Option<TranslationJob>>,
}

#[async_trait]
impl JobRepository for StaleReadRepository {
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError> {
        self.inner.create(job).await
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError> {
        let stale = self.snapshot.lock().unwrap().take();
        match stale {
            Some(job) => Ok(Some(job)),
            None => self.inner.get_by_id(id).await,
        }
    }

    async fn list_by_status(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<TranslationJob>, RepositoryError> {
        self.inner.list_by_status(status).await
    }

    async fn claim(
        &self,
        id: JobId,
        worker_id: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        self.inner.claim(id, worker_id, estimated_completion).await
    }

    async fn update(
        &self,
        id: JobId,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.inner.update(id, patch).await
    }

    async fn transition(
        &self,
        id: JobId,
        guard: &JobGuard,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.inner.transition(id, guard, patch).await
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        self.inner.delete(id).await
    }

    async fn count_by_status(&self) -> Result<JobStats, RepositoryError> {
        self.inner.count_by_status().await
    }
}

#[tokio::test]
async fn given_retry_racing_an_earlier_retry_when_retrying_then_attempt_is_not_lost() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let id = failed_job(&repository, 0).await;
    let stale = repository.get_by_id(id).await.unwrap().unwrap();

    // Another retry requeues the job, which is claimed and fails again.
    RetryManager::new(Arc::clone(&repository)).retry(id).await.unwrap();
    assert!(repository.claim(id, "worker-2", None).await.unwrap());
    repository
        .transition(id, &JobGuard::owned_by("worker-2"), &JobPatch::failed("boom again"))
        .await
        .unwrap()
        .expect("fail transition refused");

    let racing: Arc<dyn JobRepository> = Arc::new(StaleReadRepository {
        inner: Arc::clone(&repository),
        snapshot: Mutex::new(Some(stale)),
    });
    let result = RetryManager::new(racing).retry(id).await;

    assert!(matches!(
        result,
        Err(JobError::InvalidState {
            status: JobStatus::Failed,
            ..
        })
    ));
    let stored = repository.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.retry_count, 1);
}

#[tokio::test]
async fn given_unknown_job_when_retrying_then_not_found() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(repository);

    let result = manager.retry(JobId::new()).await;

    assert!(matches!(result, Err(JobError::NotFound(_))));
}

#[tokio::test]
async fn given_processing_job_when_cancelling_then_cancelled_and_worker_cleared() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    let job = store_processing(repository.as_ref(), &job).await;

    let cancelled = manager.cancel(job.id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert!(cancelled.assigned_worker.is_none());
}

#[tokio::test]
async fn given_completed_job_when_cancelling_then_invalid_state() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let manager = RetryManager::new(Arc::clone(&repository));
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    let job = store_processing(repository.as_ref(), &job).await;
    repository
        .transition(
            job.id,
            &JobGuard::status(JobStatus::Processing),
            &JobPatch::completed(Default::default(), Default::default(), Utc::now()),
        )
        .await
        .unwrap();

    let result = manager.cancel(job.id).await;

    assert!(matches!(
        result,
        Err(JobError::InvalidState {
            status: JobStatus::Completed,
            ..
        })
    ));
}
