use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{JobStatus, Language, TranslatedArticle};

/// Partial update of a job record. `None` leaves a field untouched; for
/// nullable columns `Some(None)` clears the value.
///
/// `progress` overwrites the stored value and is only used to reset or finish
/// a job. `progress_floor` raises it and never lowers it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub progress_floor: Option<u8>,
    pub assigned_worker: Option<Option<String>>,
    pub error_message: Option<Option<String>>,
    pub retry_count: Option<u32>,
    pub translated_content: Option<BTreeMap<Language, String>>,
    pub translated_articles: Option<BTreeMap<Language, Vec<TranslatedArticle>>>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub estimated_completion: Option<Option<DateTime<Utc>>>,
}

impl JobPatch {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress_floor: Some(progress.min(100)),
            ..Default::default()
        }
    }

    pub fn claimed(
        worker_id: &str,
        started_at: DateTime<Utc>,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: Some(JobStatus::Processing),
            progress: Some(0),
            assigned_worker: Some(Some(worker_id.to_string())),
            started_at: Some(Some(started_at)),
            estimated_completion: Some(estimated_completion),
            ..Default::default()
        }
    }

    pub fn completed(
        translated_content: BTreeMap<Language, String>,
        translated_articles: BTreeMap<Language, Vec<TranslatedArticle>>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            assigned_worker: Some(None),
            error_message: Some(None),
            translated_content: Some(translated_content),
            translated_articles: Some(translated_articles),
            completed_at: Some(Some(completed_at)),
            ..Default::default()
        }
    }

    /// Progress is deliberately left alone so the job keeps the value it had
    /// before the failing task.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            assigned_worker: Some(None),
            error_message: Some(Some(error_message.into())),
            ..Default::default()
        }
    }

    pub fn requeued(retry_count: u32) -> Self {
        Self {
            status: Some(JobStatus::Pending),
            progress: Some(0),
            assigned_worker: Some(None),
            error_message: Some(None),
            retry_count: Some(retry_count),
            started_at: Some(None),
            estimated_completion: Some(None),
            ..Default::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: Some(JobStatus::Cancelled),
            assigned_worker: Some(None),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
