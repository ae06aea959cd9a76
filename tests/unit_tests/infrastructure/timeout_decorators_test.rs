use std::sync::Arc;
use std::time::Duration;

use globalnews::application::ports::{
    JobRepository, ProviderError, TranslationProvider, TranslationRequest,
};
use globalnews::domain::{ContentType, JobPriority, JobStatus, Language};
use globalnews::infrastructure::decorators::{TimeoutJobRepository, TimeoutTranslationProvider};
use globalnews::infrastructure::persistence::InMemoryJobRepository;
use globalnews::infrastructure::translation::ScaffoldTranslationProvider;

use crate::support::{HangingProvider, hello_article, new_job};

fn request() -> TranslationRequest {
    TranslationRequest {
        text: "Hello".to_string(),
        source: None,
        target: Language::Es,
        content_type: ContentType::Title,
    }
}

#[tokio::test]
async fn given_hanging_provider_when_translating_then_timeout_error() {
    let provider =
        TimeoutTranslationProvider::new(Arc::new(HangingProvider), Duration::from_millis(20));

    let result = provider.translate(&request()).await;

    assert!(matches!(result, Err(ProviderError::Timeout(20))));
}

#[tokio::test]
async fn given_fast_provider_when_translating_then_result_passes_through() {
    let provider = TimeoutTranslationProvider::new(
        Arc::new(ScaffoldTranslationProvider::default()),
        Duration::from_secs(1),
    );

    let translation = provider.translate(&request()).await.unwrap();

    assert_eq!(translation.text, "[es] Hello");
}

#[tokio::test]
async fn given_fast_store_when_claiming_through_decorator_then_claim_protocol_is_unchanged() {
    let repository = TimeoutJobRepository::new(
        Arc::new(InMemoryJobRepository::new()),
        Duration::from_secs(1),
    );
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();

    assert!(repository.claim(job.id, "w1", None).await.unwrap());
    assert!(!repository.claim(job.id, "w2", None).await.unwrap());
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
}
