use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, JobStats, RepositoryError};
use crate::domain::{
    JobGuard, JobId, JobPatch, JobStatus, Language, SourceArticle, TranslatedArticle,
    TranslationJob,
};

const JOB_COLUMNS: &str = "id, title, content, source_language, target_languages, priority, \
     status, progress, assigned_worker, original_articles, translated_content, \
     translated_articles, retry_count, max_retries, error_message, created_at, updated_at, \
     started_at, completed_at, estimated_completion";

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_patch(
        &self,
        id: JobId,
        guard: Option<&JobGuard>,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE translation_jobs SET updated_at = NOW()");

        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(progress) = patch.progress {
            query.push(", progress = ").push_bind(i16::from(progress.min(100)));
        } else if let Some(floor) = patch.progress_floor {
            query
                .push(", progress = GREATEST(progress, ")
                .push_bind(i16::from(floor.min(100)))
                .push(")");
        }
        if let Some(worker) = &patch.assigned_worker {
            query.push(", assigned_worker = ").push_bind(worker.clone());
        }
        if let Some(message) = &patch.error_message {
            query.push(", error_message = ").push_bind(message.clone());
        }
        if let Some(retry_count) = patch.retry_count {
            query.push(", retry_count = ").push_bind(retry_count as i32);
        }
        if let Some(content) = &patch.translated_content {
            query
                .push(", translated_content = ")
                .push_bind(Json(content.clone()));
        }
        if let Some(articles) = &patch.translated_articles {
            query
                .push(", translated_articles = ")
                .push_bind(Json(articles.clone()));
        }
        if let Some(started_at) = patch.started_at {
            query.push(", started_at = ").push_bind(started_at);
        }
        if let Some(completed_at) = patch.completed_at {
            query.push(", completed_at = ").push_bind(completed_at);
        }
        if let Some(eta) = patch.estimated_completion {
            query.push(", estimated_completion = ").push_bind(eta);
        }

        query.push(" WHERE id = ").push_bind(id.as_uuid());
        if let Some(guard) = guard {
            query.push(" AND status = ").push_bind(guard.status.as_str());
            if let Some(worker) = &guard.assigned_worker {
                query.push(" AND assigned_worker = ").push_bind(worker.clone());
            }
            if let Some(retry_count) = guard.retry_count {
                query.push(" AND retry_count = ").push_bind(retry_count as i32);
            }
        }
        query.push(" RETURNING ").push(JOB_COLUMNS);

        let row = query
            .build_query_as::<JobRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TranslationJob::try_from).transpose()
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &TranslationJob) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO translation_jobs (
                id, title, content, source_language, target_languages, priority, priority_rank,
                status, progress, assigned_worker, original_articles, translated_content,
                translated_articles, retry_count, max_retries, error_message, created_at,
                updated_at, started_at, completed_at, estimated_completion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.content)
        .bind(job.source_language.code())
        .bind(Json(&job.target_languages))
        .bind(job.priority.as_str())
        .bind(job.priority.rank())
        .bind(job.status.as_str())
        .bind(i16::from(job.progress))
        .bind(&job.assigned_worker)
        .bind(Json(&job.original_articles))
        .bind(Json(&job.translated_content))
        .bind(Json(&job.translated_articles))
        .bind(job.retry_count as i32)
        .bind(job.max_retries as i32)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.estimated_completion)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<TranslationJob>, RepositoryError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM translation_jobs WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TranslationJob::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_status(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<TranslationJob>, RepositoryError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM translation_jobs
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY priority_rank DESC, created_at ASC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TranslationJob::try_from).collect()
    }

    #[instrument(skip(self, estimated_completion), fields(job_id = %id, worker_id = %worker_id))]
    async fn claim(
        &self,
        id: JobId,
        worker_id: &str,
        estimated_completion: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        // The status guard makes this the single compare-and-swap; a
        // concurrent claimant sees zero rows affected.
        let result = sqlx::query(
            r#"
            UPDATE translation_jobs
            SET status = 'processing',
                assigned_worker = $2,
                progress = 0,
                started_at = NOW(),
                estimated_completion = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(worker_id)
        .bind(estimated_completion)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, patch), fields(job_id = %id))]
    async fn update(
        &self,
        id: JobId,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.apply_patch(id, None, patch).await
    }

    #[instrument(skip(self, guard, patch), fields(job_id = %id, expected = %guard.status))]
    async fn transition(
        &self,
        id: JobId,
        guard: &JobGuard,
        patch: &JobPatch,
    ) -> Result<Option<TranslationJob>, RepositoryError> {
        self.apply_patch(id, Some(guard), patch).await
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn delete(&self, id: JobId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM translation_jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> Result<JobStats, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM translation_jobs GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut stats = JobStats::default();
        for (status, count) in rows {
            let status = status
                .parse::<JobStatus>()
                .map_err(RepositoryError::CorruptRow)?;
            stats.record(status, count);
        }
        Ok(stats)
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    title: Option<String>,
    content: Option<String>,
    source_language: String,
    target_languages: Json<Vec<Language>>,
    priority: String,
    status: String,
    progress: i16,
    assigned_worker: Option<String>,
    original_articles: Json<Vec<SourceArticle>>,
    translated_content: Json<BTreeMap<Language, String>>,
    translated_articles: Json<BTreeMap<Language, Vec<TranslatedArticle>>>,
    retry_count: i32,
    max_retries: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_completion: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for TranslationJob {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        Ok(TranslationJob {
            id: JobId::from_uuid(r.id),
            title: r.title,
            content: r.content,
            source_language: r
                .source_language
                .parse()
                .map_err(RepositoryError::CorruptRow)?,
            target_languages: r.target_languages.0,
            priority: r.priority.parse().map_err(RepositoryError::CorruptRow)?,
            status: r.status.parse().map_err(RepositoryError::CorruptRow)?,
            progress: r.progress.clamp(0, 100) as u8,
            assigned_worker: r.assigned_worker,
            original_articles: r.original_articles.0,
            translated_content: r.translated_content.0,
            translated_articles: r.translated_articles.0,
            retry_count: r.retry_count.max(0) as u32,
            max_retries: r.max_retries.max(0) as u32,
            error_message: r.error_message,
            created_at: r.created_at,
            updated_at: r.updated_at,
            started_at: r.started_at,
            completed_at: r.completed_at,
            estimated_completion: r.estimated_completion,
        })
    }
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
            RepositoryError::ConstraintViolation(db.to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(e.to_string())
        }
        other => RepositoryError::QueryFailed(other.to_string()),
    }
}
