use std::sync::Arc;

use crate::application::ports::{JobRepository, TranslationProvider};
use crate::application::services::{ArticleTranslator, JobScheduler, JobService, RetryManager};
use crate::presentation::config::Settings;

pub struct AppState<P: TranslationProvider + ?Sized> {
    pub job_service: Arc<JobService>,
    pub retry_manager: Arc<RetryManager>,
    pub scheduler: Arc<JobScheduler>,
    pub article_translator: Arc<ArticleTranslator<P>>,
    pub provider: Arc<P>,
    pub settings: Settings,
}

impl<P: TranslationProvider + ?Sized> AppState<P> {
    /// Wires the job services over one store and the interactive translator
    /// over `provider`.
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        provider: Arc<P>,
        settings: Settings,
    ) -> Self {
        Self {
            job_service: Arc::new(JobService::new(
                Arc::clone(&job_repository),
                settings.worker.default_max_retries,
            )),
            retry_manager: Arc::new(RetryManager::new(Arc::clone(&job_repository))),
            scheduler: Arc::new(JobScheduler::new(
                job_repository,
                settings.worker.estimated_seconds_per_task,
            )),
            article_translator: Arc::new(ArticleTranslator::new(Arc::clone(&provider))),
            provider,
            settings,
        }
    }
}

impl<P: TranslationProvider + ?Sized> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            job_service: Arc::clone(&self.job_service),
            retry_manager: Arc::clone(&self.retry_manager),
            scheduler: Arc::clone(&self.scheduler),
            article_translator: Arc::clone(&self.article_translator),
            provider: Arc::clone(&self.provider),
            settings: self.settings.clone(),
        }
    }
}
