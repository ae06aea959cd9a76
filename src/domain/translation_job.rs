use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    JobId, JobPatch, JobPriority, JobStatus, Language, SourceArticle, TranslatedArticle,
};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Already-validated input for a new job.
#[derive(Debug, Clone)]
pub struct NewTranslationJob {
    pub title: Option<String>,
    pub content: Option<String>,
    pub source_language: Language,
    pub target_languages: Vec<Language>,
    pub priority: JobPriority,
    pub original_articles: Vec<SourceArticle>,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationJob {
    pub id: JobId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub source_language: Language,
    pub target_languages: Vec<Language>,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub progress: u8,
    pub assigned_worker: Option<String>,
    pub original_articles: Vec<SourceArticle>,
    pub translated_content: BTreeMap<Language, String>,
    pub translated_articles: BTreeMap<Language, Vec<TranslatedArticle>>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl TranslationJob {
    pub fn new(new: NewTranslationJob) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            title: new.title,
            content: new.content,
            source_language: new.source_language,
            target_languages: new.target_languages,
            priority: new.priority,
            status: JobStatus::Pending,
            progress: 0,
            assigned_worker: None,
            original_articles: new.original_articles,
            translated_content: BTreeMap::new(),
            translated_articles: BTreeMap::new(),
            retry_count: 0,
            max_retries: new.max_retries,
            error_message: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            estimated_completion: None,
        }
    }

    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed && self.retry_count < self.max_retries
    }

    /// Jobs without articles translate their title and body directly.
    pub fn is_content_only(&self) -> bool {
        self.original_articles.is_empty()
    }

    /// Number of title/summary (or title/content) translation calls a full run makes.
    pub fn translation_task_count(&self) -> usize {
        let units = if self.is_content_only() {
            1
        } else {
            self.original_articles.len()
        };
        units * self.target_languages.len() * 2
    }

    pub fn apply(&mut self, patch: &JobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.min(100);
        }
        if let Some(floor) = patch.progress_floor {
            self.progress = self.progress.max(floor.min(100));
        }
        if let Some(worker) = &patch.assigned_worker {
            self.assigned_worker = worker.clone();
        }
        if let Some(message) = &patch.error_message {
            self.error_message = message.clone();
        }
        if let Some(retry_count) = patch.retry_count {
            self.retry_count = retry_count;
        }
        if let Some(content) = &patch.translated_content {
            self.translated_content = content.clone();
        }
        if let Some(articles) = &patch.translated_articles {
            self.translated_articles = articles.clone();
        }
        if let Some(started_at) = patch.started_at {
            self.started_at = started_at;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(eta) = patch.estimated_completion {
            self.estimated_completion = eta;
        }
        self.updated_at = Utc::now();
    }
}
