/// Failures of the job store itself. A missing job is not an error here;
/// lookups return `None` and the services decide what that means.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("job store unreachable: {0}")]
    ConnectionFailed(String),
    #[error("job store query failed: {0}")]
    QueryFailed(String),
    #[error("schema migration failed: {0}")]
    Migration(String),
    #[error("stored job is unreadable: {0}")]
    CorruptRow(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("job store timed out: {0}")]
    Timeout(String),
}
