mod job_repository;
mod repository_error;
mod translation_provider;

pub use job_repository::{JobRepository, JobStats};
pub use repository_error::RepositoryError;
pub use translation_provider::{
    ProviderError, Summary, SummaryRequest, SummaryStyle, Translation, TranslationProvider,
    TranslationRequest,
};
