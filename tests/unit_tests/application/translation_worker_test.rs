use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use globalnews::application::ports::JobRepository;
use globalnews::application::services::{
    JobScheduler, JobService, OrchestratorSettings, TranslationOrchestrator, TranslationWorker,
};
use globalnews::domain::{JobPriority, JobStatus, Language};
use globalnews::infrastructure::persistence::InMemoryJobRepository;

use crate::support::{ScriptedProvider, hello_article, new_job};

fn worker(
    provider: &Arc<ScriptedProvider>,
    repository: &Arc<dyn JobRepository>,
) -> TranslationWorker<ScriptedProvider> {
    let scheduler = Arc::new(JobScheduler::new(Arc::clone(repository), 3));
    let orchestrator = Arc::new(TranslationOrchestrator::new(
        Arc::clone(provider),
        Arc::clone(repository),
        OrchestratorSettings::default(),
    ));
    TranslationWorker::new(
        "worker-1",
        scheduler,
        orchestrator,
        Arc::clone(repository),
        Duration::from_millis(10),
    )
}

#[tokio::test]
async fn given_pending_job_when_processing_then_job_completes_with_results() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let provider = Arc::new(ScriptedProvider::new());
    let job = new_job(
        vec![hello_article()],
        vec![Language::Es, Language::Fr],
        JobPriority::Normal,
    );
    repository.create(&job).await.unwrap();

    let processed = worker(&provider, &repository).process_next().await.unwrap();

    assert!(processed);
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.progress, 100);
    assert!(stored.assigned_worker.is_none());
    assert!(stored.completed_at.is_some());
    assert_eq!(stored.translated_content.len(), 2);
    assert_eq!(stored.translated_articles[&Language::Fr][0].id, "a1");
}

#[tokio::test]
async fn given_provider_error_on_second_task_when_processing_then_job_fails_without_results() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let provider = Arc::new(ScriptedProvider::failing_on_call(2));
    let job = new_job(
        vec![hello_article()],
        vec![Language::Es, Language::Fr],
        JobPriority::Normal,
    );
    repository.create(&job).await.unwrap();

    worker(&provider, &repository).process_next().await.unwrap();

    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.progress, 26);
    assert!(stored.translated_content.is_empty());
    assert!(stored.translated_articles.is_empty());
    let message = stored.error_message.expect("error message missing");
    assert!(message.contains("a1"));
    assert!(message.contains("HTTP 500"));
}

#[tokio::test]
async fn given_job_released_and_reclaimed_mid_run_when_processing_then_old_worker_stops() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let provider = Arc::new(ScriptedProvider::new());
    let job = new_job(
        vec![hello_article()],
        vec![Language::Es, Language::Fr],
        JobPriority::Normal,
    );
    repository.create(&job).await.unwrap();
    let job_service = Arc::new(JobService::new(Arc::clone(&repository), 3));
    provider.reassign_on_first_call(job_service, Arc::clone(&repository), job.id, "worker-2");

    let processed = worker(&provider, &repository).process_next().await.unwrap();

    assert!(processed);
    assert_eq!(provider.translate_calls(), 1);
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert_eq!(stored.assigned_worker.as_deref(), Some("worker-2"));
    assert_eq!(stored.progress, 0);
    assert!(stored.translated_content.is_empty());
    assert!(stored.completed_at.is_none());
}

#[tokio::test]
async fn given_empty_queue_when_processing_then_nothing_happens() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let provider = Arc::new(ScriptedProvider::new());

    let processed = worker(&provider, &repository).process_next().await.unwrap();

    assert!(!processed);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn given_running_worker_when_shutdown_signalled_then_it_stops_after_draining_queue() {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let provider = Arc::new(ScriptedProvider::new());
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::High);
    repository.create(&job).await.unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(worker(&provider, &repository).run(shutdown_rx));

    let mut completed = false;
    for _ in 0..100 {
        let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
        if stored.status == JobStatus::Completed {
            completed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(completed);
}
