use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ContentType, Language};

/// Single-text translation and summarization backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, ProviderError>;

    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    /// `None` lets the backend detect the source language.
    pub source: Option<Language>,
    pub target: Language,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub quality_score: Option<f32>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub text: String,
    pub language: Language,
    pub max_length: usize,
    pub style: SummaryStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    #[default]
    Concise,
    Detailed,
    Bullet,
}

impl SummaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Concise => "concise",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::Bullet => "bullet",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("timed out after {0}ms")]
    Timeout(u128),
}
