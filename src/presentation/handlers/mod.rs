mod error;
mod health;
mod jobs;
mod translate_article;

pub use error::ErrorResponse;
pub use health::health_handler;
pub use jobs::{
    cancel_job_handler, claim_job_handler, delete_job_handler, enqueue_job_handler,
    get_job_handler, job_stats_handler, list_jobs_handler, retry_job_handler, update_job_handler,
};
pub use translate_article::translate_article_handler;
