use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::application::ports::{
    JobRepository, ProviderError, RepositoryError, SummaryRequest, SummaryStyle,
    TranslationProvider, TranslationRequest,
};
use crate::domain::{
    ContentType, JobGuard, JobPatch, JobStatus, Language, SourceArticle, TranslatedArticle,
    TranslationJob, merge_translated_article,
};

use super::{PhaseWeights, ProgressTracker};

pub const DEFAULT_NEWSLETTER_TITLE: &str = "GlobalNews Newsletter";
pub const READ_MORE_LABEL: &str = "Read more:";
pub const CLOSING_LINE: &str = "Thank you for reading GlobalNews.";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub weights: PhaseWeights,
    pub summary_max_length: usize,
    pub summary_style: SummaryStyle,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            weights: PhaseWeights::default(),
            summary_max_length: 150,
            summary_style: SummaryStyle::Concise,
        }
    }
}

/// Everything a successful batch run produced. Nothing in here reaches the
/// store unless the whole run succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub translated_content: BTreeMap<Language, String>,
    pub translated_articles: BTreeMap<Language, Vec<TranslatedArticle>>,
}

/// Drives one newsletter job through the provider, one call at a time.
/// Sequential on purpose: it keeps the backend under its rate limit and
/// makes the first failure the only failure.
pub struct TranslationOrchestrator<P: TranslationProvider + ?Sized> {
    provider: Arc<P>,
    job_repository: Arc<dyn JobRepository>,
    settings: OrchestratorSettings,
}

impl<P: TranslationProvider + ?Sized> TranslationOrchestrator<P> {
    pub fn new(
        provider: Arc<P>,
        job_repository: Arc<dyn JobRepository>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            provider,
            job_repository,
            settings,
        }
    }

    pub async fn run(&self, job: &TranslationJob) -> Result<BatchOutcome, OrchestrationError> {
        let mut tracker = ProgressTracker::new(
            self.settings.weights,
            job.translation_task_count(),
            job.target_languages.len(),
        );

        self.ensure_active(job).await?;
        if let Some(progress) = tracker.start() {
            self.report(job, progress).await?;
        }

        if job.is_content_only() {
            let translated_content = self.run_content(job, &mut tracker).await?;
            return Ok(BatchOutcome {
                translated_content,
                translated_articles: BTreeMap::new(),
            });
        }

        let translated_articles = self.run_articles(job, &mut tracker).await?;
        let translated_content = self
            .assemble(job, &translated_articles, &mut tracker)
            .await?;

        Ok(BatchOutcome {
            translated_content,
            translated_articles,
        })
    }

    async fn run_articles(
        &self,
        job: &TranslationJob,
        tracker: &mut ProgressTracker,
    ) -> Result<BTreeMap<Language, Vec<TranslatedArticle>>, OrchestrationError> {
        let mut translated: BTreeMap<Language, Vec<TranslatedArticle>> = BTreeMap::new();

        for article in &job.original_articles {
            self.ensure_active(job).await?;
            let summary = match article.usable_description() {
                Some(description) => description.to_string(),
                None => self.synthesize_summary(job, article).await,
            };

            for &language in &job.target_languages {
                self.ensure_active(job).await?;
                let title = self
                    .translate(job, &article.title, language, ContentType::Title, &article.id)
                    .await?;
                self.task_completed(job, tracker).await?;

                self.ensure_active(job).await?;
                let translated_summary = self
                    .translate(job, &summary, language, ContentType::Description, &article.id)
                    .await?;
                self.task_completed(job, tracker).await?;

                merge_translated_article(
                    translated.entry(language).or_default(),
                    &article.id,
                    language,
                    title,
                    translated_summary,
                );
            }
        }

        Ok(translated)
    }

    async fn assemble(
        &self,
        job: &TranslationJob,
        translated: &BTreeMap<Language, Vec<TranslatedArticle>>,
        tracker: &mut ProgressTracker,
    ) -> Result<BTreeMap<Language, String>, OrchestrationError> {
        // Duplicate ids resolve to the last occurrence, same as the merge.
        let urls: HashMap<&str, &str> = job
            .original_articles
            .iter()
            .map(|a| (a.id.as_str(), a.url.as_str()))
            .collect();
        let job_title = newsletter_title(job);
        let mut contents = BTreeMap::new();

        for &language in &job.target_languages {
            self.ensure_active(job).await?;
            let title = self
                .translate(job, job_title, language, ContentType::Title, "newsletter")
                .await?;
            let read_more = self
                .translate(job, READ_MORE_LABEL, language, ContentType::Content, "newsletter")
                .await?;
            let closing = self
                .translate(job, CLOSING_LINE, language, ContentType::Content, "newsletter")
                .await?;

            let articles = translated.get(&language).map(Vec::as_slice).unwrap_or(&[]);
            let body = render_newsletter(&title, articles, language, &urls, &read_more, &closing);
            contents.insert(language, body);

            if let Some(progress) = tracker.language_assembled() {
                self.report(job, progress).await?;
            }
        }

        Ok(contents)
    }

    async fn run_content(
        &self,
        job: &TranslationJob,
        tracker: &mut ProgressTracker,
    ) -> Result<BTreeMap<Language, String>, OrchestrationError> {
        let job_title = newsletter_title(job);
        let content = job.content.as_deref().unwrap_or_default();
        let mut translated = Vec::with_capacity(job.target_languages.len());

        for &language in &job.target_languages {
            self.ensure_active(job).await?;
            let title = self
                .translate(job, job_title, language, ContentType::Title, "newsletter")
                .await?;
            self.task_completed(job, tracker).await?;

            self.ensure_active(job).await?;
            let body = self
                .translate(job, content, language, ContentType::Content, "newsletter")
                .await?;
            self.task_completed(job, tracker).await?;

            translated.push((language, title, body));
        }

        let mut contents = BTreeMap::new();
        for (language, title, body) in translated {
            contents.insert(language, format!("# {title}\n\n{body}"));
            if let Some(progress) = tracker.language_assembled() {
                self.report(job, progress).await?;
            }
        }
        Ok(contents)
    }

    /// Summarization is best effort even in strict mode: the title stands in
    /// for a summary the backend could not produce.
    async fn synthesize_summary(&self, job: &TranslationJob, article: &SourceArticle) -> String {
        let request = SummaryRequest {
            text: article.title.clone(),
            language: job.source_language,
            max_length: self.settings.summary_max_length,
            style: self.settings.summary_style,
        };

        match self.provider.summarize(&request).await {
            Ok(summary) if !summary.summary.trim().is_empty() => summary.summary,
            Ok(_) => article.title.clone(),
            Err(e) => {
                tracing::warn!(
                    article_id = %article.id,
                    error = %e,
                    "Summarization failed, falling back to title"
                );
                article.title.clone()
            }
        }
    }

    async fn translate(
        &self,
        job: &TranslationJob,
        text: &str,
        target: Language,
        content_type: ContentType,
        subject: &str,
    ) -> Result<String, OrchestrationError> {
        if target == job.source_language || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = TranslationRequest {
            text: text.to_string(),
            source: Some(job.source_language),
            target,
            content_type,
        };

        self.provider
            .translate(&request)
            .await
            .map(|translation| translation.text)
            .map_err(|source| OrchestrationError::Provider {
                subject: subject.to_string(),
                content_type,
                language: target,
                source,
            })
    }

    async fn task_completed(
        &self,
        job: &TranslationJob,
        tracker: &mut ProgressTracker,
    ) -> Result<(), OrchestrationError> {
        match tracker.task_completed() {
            Some(progress) => self.report(job, progress).await,
            None => Ok(()),
        }
    }

    /// Raises stored progress while this worker still owns the job; a
    /// refused write means it was cancelled or handed to someone else.
    async fn report(&self, job: &TranslationJob, progress: u8) -> Result<(), OrchestrationError> {
        tracing::debug!(job_id = %job.id, progress, "Progress update");
        match self
            .job_repository
            .transition(job.id, &owner_guard(job), &JobPatch::progress(progress))
            .await?
        {
            Some(_) => Ok(()),
            None => Err(OrchestrationError::Cancelled),
        }
    }

    async fn ensure_active(&self, job: &TranslationJob) -> Result<(), OrchestrationError> {
        match self.job_repository.get_by_id(job.id).await? {
            Some(current) if owner_guard(job).matches(&current) => Ok(()),
            _ => Err(OrchestrationError::Cancelled),
        }
    }
}

/// Guard for writes made on behalf of whoever claimed `job`.
fn owner_guard(job: &TranslationJob) -> JobGuard {
    match &job.assigned_worker {
        Some(worker) => JobGuard::owned_by(worker.clone()),
        None => JobGuard::status(JobStatus::Processing),
    }
}

fn newsletter_title(job: &TranslationJob) -> &str {
    job.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_NEWSLETTER_TITLE)
}

fn render_newsletter(
    title: &str,
    articles: &[TranslatedArticle],
    language: Language,
    urls: &HashMap<&str, &str>,
    read_more: &str,
    closing: &str,
) -> String {
    let mut body = format!("# {title}\n\n");
    for (index, article) in articles.iter().enumerate() {
        let article_title = article.title.get(&language).map(String::as_str).unwrap_or("");
        let summary = article
            .summary
            .get(&language)
            .map(String::as_str)
            .unwrap_or("");
        body.push_str(&format!("{}. {}\n{}\n", index + 1, article_title, summary));
        if let Some(url) = urls.get(article.id.as_str()).filter(|u| !u.is_empty()) {
            body.push_str(&format!("{read_more} {url}\n"));
        }
        body.push('\n');
    }
    body.push_str(closing);
    body
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("translating {} of {subject} to {language}: {source}", .content_type.as_str())]
    Provider {
        subject: String,
        content_type: ContentType,
        language: Language,
        #[source]
        source: ProviderError,
    },
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("job is no longer processing under this worker")]
    Cancelled,
}
