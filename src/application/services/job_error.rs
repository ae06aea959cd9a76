use crate::application::ports::RepositoryError;
use crate::domain::{JobId, JobStatus};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("cannot {operation} job {id} while it is {status}")]
    InvalidState {
        id: JobId,
        status: JobStatus,
        operation: &'static str,
    },
    #[error("job {id} has used {retry_count} of {max_retries} retries")]
    RetryBudgetExceeded {
        id: JobId,
        retry_count: u32,
        max_retries: u32,
    },
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
