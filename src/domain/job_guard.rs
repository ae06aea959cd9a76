use super::{JobStatus, TranslationJob};

/// Condition a stored job must meet for a guarded write to apply. The status
/// is always checked; owner and retry count only when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGuard {
    pub status: JobStatus,
    pub assigned_worker: Option<String>,
    pub retry_count: Option<u32>,
}

impl JobGuard {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status,
            assigned_worker: None,
            retry_count: None,
        }
    }

    /// A processing job held by `worker_id`.
    pub fn owned_by(worker_id: impl Into<String>) -> Self {
        Self {
            assigned_worker: Some(worker_id.into()),
            ..Self::status(JobStatus::Processing)
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn matches(&self, job: &TranslationJob) -> bool {
        job.status == self.status
            && self
                .assigned_worker
                .as_deref()
                .is_none_or(|worker| job.assigned_worker.as_deref() == Some(worker))
            && self.retry_count.is_none_or(|count| job.retry_count == count)
    }
}
