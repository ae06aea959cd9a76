use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ProviderError, Summary, SummaryRequest, SummaryStyle, Translation, TranslationProvider,
    TranslationRequest,
};

/// Client for the GlobalNews LLM API (NLLB translation, LLaMA summarization).
pub struct HttpTranslationClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
    content_type: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
    #[serde(default)]
    quality_score: Option<f32>,
    #[serde(default)]
    confidence: Option<f32>,
}

#[derive(Serialize)]
struct SummarizeBody<'a> {
    text: &'a str,
    style: &'a str,
    max_length: usize,
    language: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
}

impl HttpTranslationClient {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.request_timeout.as_millis())
        } else {
            ProviderError::ApiRequestFailed(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl TranslationProvider for HttpTranslationClient {
    #[tracing::instrument(
        skip(self, request),
        fields(target = %request.target, content_type = request.content_type.as_str())
    )]
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, ProviderError> {
        let body = TranslateBody {
            text: &request.text,
            source_language: request.source.map(|l| l.code()).unwrap_or("auto"),
            target_language: request.target.code(),
            content_type: request.content_type.as_str(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if parsed.translated_text.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "empty translation".to_string(),
            ));
        }

        Ok(Translation {
            text: parsed.translated_text,
            quality_score: parsed.quality_score,
            confidence: parsed.confidence,
        })
    }

    #[tracing::instrument(skip(self, request), fields(language = %request.language))]
    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ProviderError> {
        let body = SummarizeBody {
            text: &request.text,
            style: request.style.as_str(),
            max_length: request.max_length,
            language: request.language.english_name(),
        };

        let response = self
            .client
            .post(format!("{}/summarize", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let parsed: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let key_points = if parsed.key_points.is_empty() && request.style == SummaryStyle::Bullet {
            bullet_points(&parsed.summary)
        } else {
            parsed.key_points
        };

        Ok(Summary {
            summary: parsed.summary.trim().to_string(),
            key_points,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await.map(|_| ())
    }
}

/// Bullet-style summaries come back as one string; split out its items.
fn bullet_points(summary: &str) -> Vec<String> {
    summary
        .lines()
        .map(|line| line.trim().trim_start_matches(['•', '-', '*']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
