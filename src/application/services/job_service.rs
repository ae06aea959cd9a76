use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::application::ports::{JobRepository, JobStats};
use crate::domain::{
    JobGuard, JobId, JobPatch, JobPriority, JobStatus, Language, NewTranslationJob,
    SourceArticle, TranslatedArticle, TranslationJob,
};

use super::JobError;

pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Raw enqueue input as received from callers; validated before anything is stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnqueueJobRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub source_language: String,
    pub target_languages: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub original_articles: Vec<SourceArticle>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

/// Fields an external worker (or an operator) may change on a processing job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobUpdate {
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub translated_content: Option<BTreeMap<Language, String>>,
    #[serde(default)]
    pub translated_articles: Option<BTreeMap<Language, Vec<TranslatedArticle>>>,
}

pub struct JobService {
    job_repository: Arc<dyn JobRepository>,
    default_max_retries: u32,
}

impl JobService {
    pub fn new(job_repository: Arc<dyn JobRepository>, default_max_retries: u32) -> Self {
        Self {
            job_repository,
            default_max_retries,
        }
    }

    #[instrument(skip(self, request), fields(targets = request.target_languages.len()))]
    pub async fn enqueue(&self, request: EnqueueJobRequest) -> Result<TranslationJob, JobError> {
        let new_job = self.validate(request)?;
        let job = TranslationJob::new(new_job);
        self.job_repository.create(&job).await?;

        tracing::info!(
            job_id = %job.id,
            priority = %job.priority,
            articles = job.original_articles.len(),
            "Translation job enqueued"
        );
        Ok(job)
    }

    pub async fn get(&self, id: JobId) -> Result<TranslationJob, JobError> {
        self.job_repository
            .get_by_id(id)
            .await?
            .ok_or(JobError::NotFound(id))
    }

    pub async fn list(&self, status: Option<JobStatus>) -> Result<Vec<TranslationJob>, JobError> {
        Ok(self.job_repository.list_by_status(status).await?)
    }

    pub async fn stats(&self) -> Result<JobStats, JobError> {
        Ok(self.job_repository.count_by_status().await?)
    }

    #[instrument(skip(self), fields(job_id = %id))]
    pub async fn delete(&self, id: JobId) -> Result<(), JobError> {
        if self.job_repository.delete(id).await? {
            tracing::info!("Job deleted");
            Ok(())
        } else {
            Err(JobError::NotFound(id))
        }
    }

    /// Updates a processing job. Claiming, cancelling and retrying have
    /// their own operations and cannot be done through here.
    #[instrument(skip(self, update), fields(job_id = %id))]
    pub async fn update(&self, id: JobId, update: JobUpdate) -> Result<TranslationJob, JobError> {
        let job = self.get(id).await?;
        if job.status != JobStatus::Processing {
            return Err(JobError::InvalidState {
                id,
                status: job.status,
                operation: "update",
            });
        }

        let patch = build_update_patch(&job, update)?;
        if patch.is_empty() {
            return Ok(job);
        }

        // Only lands while the worker seen above still holds the job.
        let guard = JobGuard {
            assigned_worker: job.assigned_worker.clone(),
            ..JobGuard::status(JobStatus::Processing)
        };
        match self.job_repository.transition(id, &guard, &patch).await? {
            Some(updated) => Ok(updated),
            None => {
                let current = self.get(id).await?;
                Err(JobError::InvalidState {
                    id,
                    status: current.status,
                    operation: "update",
                })
            }
        }
    }

    fn validate(&self, request: EnqueueJobRequest) -> Result<NewTranslationJob, JobError> {
        let source_language = request
            .source_language
            .parse::<Language>()
            .map_err(JobError::Validation)?;

        if request.target_languages.is_empty() {
            return Err(JobError::Validation(
                "at least one target language is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let mut target_languages = Vec::with_capacity(request.target_languages.len());
        for code in &request.target_languages {
            let language = code.parse::<Language>().map_err(JobError::Validation)?;
            if seen.insert(language) {
                target_languages.push(language);
            }
        }

        let priority = match request.priority.as_deref() {
            Some(p) => p.parse::<JobPriority>().map_err(JobError::Validation)?,
            None => JobPriority::default(),
        };

        for article in &request.original_articles {
            if article.id.trim().is_empty() {
                return Err(JobError::Validation("article id must not be empty".to_string()));
            }
            if article.title.trim().is_empty() {
                return Err(JobError::Validation(format!(
                    "article {} has no title",
                    article.id
                )));
            }
        }

        let has_content = request
            .content
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if request.original_articles.is_empty() && !has_content {
            return Err(JobError::Validation(
                "either articles or content must be provided".to_string(),
            ));
        }

        let max_retries = request.max_retries.unwrap_or(self.default_max_retries);
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(JobError::Validation(format!(
                "max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            )));
        }

        Ok(NewTranslationJob {
            title: request.title,
            content: request.content,
            source_language,
            target_languages,
            priority,
            original_articles: request.original_articles,
            max_retries,
        })
    }
}

fn build_update_patch(job: &TranslationJob, update: JobUpdate) -> Result<JobPatch, JobError> {
    let mut patch = JobPatch::default();

    if let Some(progress) = update.progress {
        if progress > 100 {
            return Err(JobError::Validation("progress must be between 0 and 100".to_string()));
        }
        if progress < job.progress {
            return Err(JobError::Validation(format!(
                "progress cannot decrease from {} to {}",
                job.progress, progress
            )));
        }
        patch.progress_floor = Some(progress);
    }

    match update.status {
        None | Some(JobStatus::Processing) => {
            if update.translated_content.is_some() || update.translated_articles.is_some() {
                return Err(JobError::Validation(
                    "translation results are only accepted with status completed".to_string(),
                ));
            }
            if let Some(message) = update.error_message {
                patch.error_message = Some(Some(message));
            }
        }
        Some(JobStatus::Completed) => {
            let content = update
                .translated_content
                .unwrap_or_else(|| job.translated_content.clone());
            if let Some(missing) = job
                .target_languages
                .iter()
                .find(|lang| !content.contains_key(lang))
            {
                return Err(JobError::Validation(format!(
                    "translated content missing for {}",
                    missing
                )));
            }
            let articles = update
                .translated_articles
                .unwrap_or_else(|| job.translated_articles.clone());
            patch = JobPatch::completed(content, articles, Utc::now());
        }
        Some(JobStatus::Failed) => {
            let message = update
                .error_message
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| {
                    JobError::Validation("failing a job requires an error message".to_string())
                })?;
            let progress = patch.progress_floor;
            patch = JobPatch::failed(message);
            patch.progress_floor = progress;
        }
        Some(JobStatus::Pending) => {
            // Releasing a job back to the queue does not spend a retry.
            patch = JobPatch::requeued(job.retry_count);
        }
        Some(status) => {
            return Err(JobError::Validation(format!(
                "status {} cannot be set through update",
                status
            )));
        }
    }

    Ok(patch)
}
