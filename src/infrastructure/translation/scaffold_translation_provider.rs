use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    ProviderError, Summary, SummaryRequest, Translation, TranslationProvider, TranslationRequest,
};

/// Offline stand-in for the LLM backend: tags text with the target language
/// and summarizes by taking the first sentence.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldTranslationProvider {
    delay: Duration,
}

impl ScaffoldTranslationProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl TranslationProvider for ScaffoldTranslationProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, ProviderError> {
        self.pause().await;
        Ok(Translation {
            text: format!("[{}] {}", request.target, request.text),
            quality_score: Some(1.0),
            confidence: Some(1.0),
        })
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ProviderError> {
        self.pause().await;
        let first_sentence = request
            .text
            .split_inclusive(['.', '!', '?'])
            .next()
            .unwrap_or_default()
            .trim();
        let summary: String = first_sentence.chars().take(request.max_length).collect();
        Ok(Summary {
            key_points: vec![summary.clone()],
            summary,
        })
    }
}
