use globalnews::application::ports::{JobRepository, RepositoryError};
use globalnews::domain::{JobGuard, JobPatch, JobPriority, JobStatus, Language};
use globalnews::infrastructure::persistence::InMemoryJobRepository;

use crate::support::{hello_article, new_job};

#[tokio::test]
async fn given_same_job_twice_when_creating_then_constraint_violation() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);

    repository.create(&job).await.unwrap();
    let result = repository.create(&job).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_claimed_job_when_claiming_again_then_refused() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();

    assert!(repository.claim(job.id, "w1", None).await.unwrap());
    assert!(!repository.claim(job.id, "w2", None).await.unwrap());

    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_worker.as_deref(), Some("w1"));
}

#[tokio::test]
async fn given_wrong_expected_status_when_transitioning_then_nothing_changes() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();

    let result = repository
        .transition(job.id, &JobGuard::status(JobStatus::Processing), &JobPatch::progress(50))
        .await
        .unwrap();

    assert!(result.is_none());
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.progress, 0);
}

#[tokio::test]
async fn given_job_held_by_another_worker_when_transitioning_as_owner_then_refused() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();
    repository.claim(job.id, "w2", None).await.unwrap();

    let result = repository
        .transition(job.id, &JobGuard::owned_by("w1"), &JobPatch::failed("late"))
        .await
        .unwrap();

    assert!(result.is_none());
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert_eq!(stored.assigned_worker.as_deref(), Some("w2"));
}

#[tokio::test]
async fn given_lower_progress_when_transitioning_then_stored_progress_is_kept() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();
    repository.claim(job.id, "w1", None).await.unwrap();
    let owned = JobGuard::owned_by("w1");

    repository
        .transition(job.id, &owned, &JobPatch::progress(80))
        .await
        .unwrap();
    let updated = repository
        .transition(job.id, &owned, &JobPatch::progress(26))
        .await
        .unwrap()
        .expect("transition refused");

    assert_eq!(updated.progress, 80);
}

#[tokio::test]
async fn given_jobs_when_listing_by_status_then_filtered_and_ordered() {
    let repository = InMemoryJobRepository::new();
    let normal = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    let high = new_job(vec![hello_article()], vec![Language::Es], JobPriority::High);
    let claimed = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Urgent);
    for job in [&normal, &high, &claimed] {
        repository.create(job).await.unwrap();
    }
    repository.claim(claimed.id, "w1", None).await.unwrap();

    let pending = repository
        .list_by_status(Some(JobStatus::Pending))
        .await
        .unwrap();
    let all = repository.list_by_status(None).await.unwrap();

    assert_eq!(
        pending.iter().map(|j| j.id).collect::<Vec<_>>(),
        vec![high.id, normal.id]
    );
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, claimed.id);
}

#[tokio::test]
async fn given_existing_job_when_deleting_then_gone() {
    let repository = InMemoryJobRepository::new();
    let job = new_job(vec![hello_article()], vec![Language::Es], JobPriority::Normal);
    repository.create(&job).await.unwrap();

    assert!(repository.delete(job.id).await.unwrap());
    assert!(!repository.delete(job.id).await.unwrap());
    assert!(repository.get_by_id(job.id).await.unwrap().is_none());
}
