use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    ProviderError, Summary, SummaryRequest, Translation, TranslationProvider, TranslationRequest,
};

/// Bounds every provider call. An elapsed deadline surfaces as
/// `ProviderError::Timeout`, which callers treat like any other failure.
pub struct TimeoutTranslationProvider {
    inner: Arc<dyn TranslationProvider>,
    timeout: Duration,
}

impl TimeoutTranslationProvider {
    pub fn new(inner: Arc<dyn TranslationProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "Provider call timed out");
                Err(ProviderError::Timeout(self.timeout.as_millis()))
            }
        }
    }
}

#[async_trait]
impl TranslationProvider for TimeoutTranslationProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, ProviderError> {
        self.bounded(self.inner.translate(request)).await
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ProviderError> {
        self.bounded(self.inner.summarize(request)).await
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.bounded(self.inner.health_check()).await
    }
}
