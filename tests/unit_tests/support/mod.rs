use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use globalnews::application::ports::{
    JobRepository, JobStats, ProviderError, RepositoryError, Summary, SummaryRequest, Translation,
    TranslationProvider, TranslationRequest,
};
use globalnews::application::services::{JobService, JobUpdate, RetryManager};
use globalnews::domain::{
    JobGuard, JobId, JobPatch, JobPriority, JobStatus, Language, NewTranslationJob,
    SourceArticle, TranslationJob,
};
use globalnews::infrastructure::persistence::InMemoryJobRepository;

pub fn new_job(
    articles: Vec<SourceArticle>,
    targets: Vec<Language>,
    priority: JobPriority,
) -> TranslationJob {
    TranslationJob::new(NewTranslationJob {
        title: None,
        content: None,
        source_language: Language::En,
        target_languages: targets,
        priority,
        original_articles: articles,
        max_retries: 3,
    })
}

pub fn content_job(title: &str, content: &str, targets: Vec<Language>) -> TranslationJob {
    TranslationJob::new(NewTranslationJob {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        source_language: Language::En,
        target_languages: targets,
        priority: JobPriority::Normal,
        original_articles: Vec::new(),
        max_retries: 3,
    })
}

pub fn hello_article() -> SourceArticle {
    SourceArticle::new("a1", "Hello", "http://x")
}

/// Stores `job` and claims it directly, leaving it in `processing`.
pub async fn store_processing(
    repository: &dyn JobRepository,
    job: &TranslationJob,
) -> TranslationJob {
    repository.create(job).await.expect("create failed");
    assert!(
        repository
            .claim(job.id, "test-worker", None)
            .await
            .expect("claim failed")
    );
    repository
        .get_by_id(job.id)
        .await
        .expect("get failed")
        .expect("job missing")
}

/// Tags text with the target language. Translate calls are counted and the
/// n-th one (1-based) can be made to fail.
#[derive(Default)]
pub struct ScriptedProvider {
    translate_calls: AtomicUsize,
    summarize_calls: AtomicUsize,
    fail_on_call: Option<usize>,
    fail_fields: HashSet<String>,
    fail_summaries: bool,
    requests: Mutex<Vec<TranslationRequest>>,
    on_first_call: OnceLock<FirstCallAction>,
}

/// Something another actor does to the job while the first translation is in flight.
enum FirstCallAction {
    Cancel(Arc<RetryManager>, JobId),
    Update(Arc<JobService>, JobId, JobUpdate),
    UpdateAndReclaim {
        job_service: Arc<JobService>,
        repository: Arc<dyn JobRepository>,
        id: JobId,
        worker_id: String,
    },
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_call(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::default()
        }
    }

    /// Fails every translation whose source text equals one of `texts`.
    pub fn failing_texts(texts: &[&str]) -> Self {
        Self {
            fail_fields: texts.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_summaries() -> Self {
        Self {
            fail_summaries: true,
            ..Self::default()
        }
    }

    pub fn cancel_on_first_call(&self, retry_manager: Arc<RetryManager>, id: JobId) {
        let _ = self
            .on_first_call
            .set(FirstCallAction::Cancel(retry_manager, id));
    }

    /// Applies an operator PATCH while the first translation is running.
    pub fn update_on_first_call(&self, job_service: Arc<JobService>, id: JobId, update: JobUpdate) {
        let _ = self
            .on_first_call
            .set(FirstCallAction::Update(job_service, id, update));
    }

    /// Releases the job back to the queue and lets `worker_id` claim it
    /// while the first translation is running.
    pub fn reassign_on_first_call(
        &self,
        job_service: Arc<JobService>,
        repository: Arc<dyn JobRepository>,
        id: JobId,
        worker_id: &str,
    ) {
        let _ = self.on_first_call.set(FirstCallAction::UpdateAndReclaim {
            job_service,
            repository,
            id,
            worker_id: worker_id.to_string(),
        });
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, ProviderError> {
        let call = self.translate_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if call == 1 {
            match self.on_first_call.get() {
                Some(FirstCallAction::Cancel(retry_manager, id)) => {
                    retry_manager.cancel(*id).await.expect("cancel failed");
                }
                Some(FirstCallAction::Update(job_service, id, update)) => {
                    job_service
                        .update(*id, update.clone())
                        .await
                        .expect("update failed");
                }
                Some(FirstCallAction::UpdateAndReclaim {
                    job_service,
                    repository,
                    id,
                    worker_id,
                }) => {
                    let release = JobUpdate {
                        status: Some(JobStatus::Pending),
                        ..Default::default()
                    };
                    job_service
                        .update(*id, release)
                        .await
                        .expect("release failed");
                    assert!(
                        repository
                            .claim(*id, worker_id, None)
                            .await
                            .expect("claim failed")
                    );
                }
                None => {}
            }
        }
        if self.fail_on_call == Some(call) || self.fail_fields.contains(&request.text) {
            return Err(ProviderError::ApiRequestFailed("HTTP 500: boom".to_string()));
        }

        Ok(Translation {
            text: format!("[{}] {}", request.target, request.text),
            quality_score: Some(0.9),
            confidence: Some(0.8),
        })
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ProviderError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summaries {
            return Err(ProviderError::RateLimited);
        }
        Ok(Summary {
            summary: format!("Summary of {}", request.text),
            key_points: Vec::new(),
        })
    }
}

/// In-memory store that also remembers every progress value it accepted.
#[derive(Default)]
pub struct RecordingJobRepository {
    inner: InMemoryJobRepository,
    progress_writes: Mutex<Vec<u8>>,
}

impl RecordingJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress_writes(&self) -> Vec<u8> {
        self.progress_writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRepository for RecordingJobRepository {
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError> {
        self.inner.create(job).await
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError> {
        self.inner.get_by_id(id).await
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
        let updated = self.inner.transition(id, guard, patch).await?;
        if let (Some(_), Some(progress)) = (&updated, patch.progress_floor) {
            self.progress_writes.lock().unwrap().push(progress);
        }
        Ok(updated)
    }

    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        self.inner.delete(id).await
    }

    async fn count_by_status(&self) -> Result<JobStats, RepositoryError> {
        self.inner.count_by_status().await
    }
}

/// Never answers; used to trip the timeout decorators.
pub struct HangingProvider;

#[async_trait]
impl TranslationProvider for HangingProvider {
    async fn translate(&self, _request: &TranslationRequest) -> Result<Translation, ProviderError> {
        std::future::pending().await
    }

    async fn summarize(&self, _request: &SummaryRequest) -> Result<Summary, ProviderError> {
        std::future::pending().await
    }
}
