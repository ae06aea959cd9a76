mod article;
mod content_type;
mod job_guard;
mod job_id;
mod job_patch;
mod job_priority;
mod job_status;
mod language;
mod translation_job;

pub use article::{SourceArticle, TranslatedArticle, merge_translated_article};
pub use content_type::ContentType;
pub use job_guard::JobGuard;
pub use job_id::JobId;
pub use job_patch::JobPatch;
pub use job_priority::JobPriority;
pub use job_status::JobStatus;
pub use language::Language;
pub use translation_job::{DEFAULT_MAX_RETRIES, NewTranslationJob, TranslationJob};
