use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{TranslationProvider, TranslationRequest};
use crate::domain::{ContentType, Language};

#[derive(Debug, Clone)]
pub struct ArticleTranslationRequest {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Declared or detected source language. `None` defers to the backend.
    pub source_language: Option<Language>,
    pub target_language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleTranslationStatus {
    Translated,
    /// At least one field fell back to its source text.
    Partial,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldTranslation {
    pub text: String,
    pub translated: bool,
    pub quality_score: Option<f32>,
    pub confidence: Option<f32>,
}

impl FieldTranslation {
    fn original(text: &str) -> Self {
        Self {
            text: text.to_string(),
            translated: false,
            quality_score: None,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleTranslation {
    pub status: ArticleTranslationStatus,
    pub source_language: Option<Language>,
    pub target_language: Language,
    pub title: FieldTranslation,
    pub description: Option<FieldTranslation>,
    pub content: Option<FieldTranslation>,
}

/// On-demand translation of a stored article. Fields are translated
/// concurrently and fail independently; a failed field keeps its source text.
pub struct ArticleTranslator<P: TranslationProvider + ?Sized> {
    provider: Arc<P>,
}

impl<P: TranslationProvider + ?Sized> ArticleTranslator<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    #[tracing::instrument(skip(self, request), fields(target = %request.target_language))]
    pub async fn translate_article(
        &self,
        request: ArticleTranslationRequest,
    ) -> ArticleTranslation {
        if request.source_language == Some(request.target_language) {
            tracing::debug!("Source and target language match, skipping translation");
            return ArticleTranslation {
                status: ArticleTranslationStatus::Skipped,
                source_language: request.source_language,
                target_language: request.target_language,
                title: FieldTranslation::original(&request.title),
                description: request.description.as_deref().map(FieldTranslation::original),
                content: request.content.as_deref().map(FieldTranslation::original),
            };
        }

        let (title, description, content) = tokio::join!(
            self.translate_field(&request, Some(&request.title), ContentType::Title),
            self.translate_field(
                &request,
                request.description.as_deref(),
                ContentType::Description
            ),
            self.translate_field(&request, request.content.as_deref(), ContentType::Content),
        );
        let title = title.unwrap_or_else(|| FieldTranslation::original(&request.title));

        let attempted = [Some(&title), description.as_ref(), content.as_ref()];
        let all_translated = attempted
            .iter()
            .flatten()
            .all(|field| field.translated || field.text.trim().is_empty());

        ArticleTranslation {
            status: if all_translated {
                ArticleTranslationStatus::Translated
            } else {
                ArticleTranslationStatus::Partial
            },
            source_language: request.source_language,
            target_language: request.target_language,
            title,
            description,
            content,
        }
    }

    async fn translate_field(
        &self,
        request: &ArticleTranslationRequest,
        text: Option<&str>,
        content_type: ContentType,
    ) -> Option<FieldTranslation> {
        let text = text?;
        if text.trim().is_empty() {
            return Some(FieldTranslation::original(text));
        }

        let translation_request = TranslationRequest {
            text: text.to_string(),
            source: request.source_language,
            target: request.target_language,
            content_type,
        };

        match self.provider.translate(&translation_request).await {
            Ok(translation) => Some(FieldTranslation {
                text: translation.text,
                translated: true,
                quality_score: translation.quality_score,
                confidence: translation.confidence,
            }),
            Err(e) => {
                tracing::warn!(
                    field = content_type.as_str(),
                    error = %e,
                    "Field translation failed, keeping original text"
                );
                Some(FieldTranslation::original(text))
            }
        }
    }
}
