mod timeout_job_repository;
mod timeout_translation_provider;

pub use timeout_job_repository::TimeoutJobRepository;
pub use timeout_translation_provider::TimeoutTranslationProvider;
