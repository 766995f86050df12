//! Dispatch queue implementation using PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_core::{ContentId, DispatchJob, DispatchSink, Error, Result, TenantId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A queued dispatch job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueuedJob {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub enterprise_id: String,
    pub content_id: String,
    pub status: String,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QueuedJob {
    pub fn dispatch_job(&self) -> DispatchJob {
        DispatchJob::new(
            UserId::new(self.user_id.as_str()),
            TenantId::new(self.enterprise_id.as_str()),
            ContentId::new(self.content_id.as_str()),
        )
    }
}

/// The worker's view of the dispatch queue.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Claim the next pending job for `worker_id`, if any.
    async fn claim(&self, worker_id: &str) -> Result<Option<QueuedJob>>;

    /// Mark a job as delivered.
    async fn complete(&self, job_id: uuid::Uuid) -> Result<()>;

    /// Mark a job as failed.
    async fn fail(&self, job_id: uuid::Uuid, error: &str) -> Result<()>;

    /// Return a claimed job to pending, e.g. when a worker shuts down
    /// mid-delivery.
    async fn release(&self, job_id: uuid::Uuid) -> Result<()>;
}

/// Dispatch queue backed by PostgreSQL.
pub struct JobQueue {
    pool: PgPool,
}

impl JobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a new job.
    pub async fn push(&self, job: &DispatchJob) -> std::result::Result<QueuedJob, sqlx::Error> {
        let queued = sqlx::query_as::<_, QueuedJob>(
            r#"
            INSERT INTO dispatch_jobs (id, user_id, enterprise_id, content_id, status, created_at)
            VALUES ($1, $2, $3, $4, 'pending', NOW())
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::now_v7())
        .bind(job.user_id.as_str())
        .bind(job.tenant_id.as_str())
        .bind(job.content_id.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(queued)
    }
}

#[async_trait]
impl DispatchSink for JobQueue {
    async fn enqueue(&self, job: &DispatchJob) -> Result<()> {
        self.push(job)
            .await
            .map(|_| ())
            .map_err(|e| Error::EnqueueFailure(e.to_string()))
    }
}

#[async_trait]
impl JobSource for JobQueue {
    /// Uses SKIP LOCKED so concurrent workers never claim the same job.
    async fn claim(&self, worker_id: &str) -> Result<Option<QueuedJob>> {
        let job = sqlx::query_as::<_, QueuedJob>(
            r#"
            UPDATE dispatch_jobs
            SET status = 'claimed', claimed_by = $1, claimed_at = NOW()
            WHERE id = (
                SELECT id FROM dispatch_jobs
                WHERE status = 'pending'
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(job)
    }

    async fn complete(&self, job_id: uuid::Uuid) -> Result<()> {
        sqlx::query("UPDATE dispatch_jobs SET status = 'completed' WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn fail(&self, job_id: uuid::Uuid, error: &str) -> Result<()> {
        sqlx::query("UPDATE dispatch_jobs SET status = 'failed', error = $2 WHERE id = $1")
            .bind(job_id)
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn release(&self, job_id: uuid::Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE dispatch_jobs SET status = 'pending', claimed_by = NULL, claimed_at = NULL WHERE id = $1",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(e: sqlx::Error) -> Error {
    Error::StoreUnavailable(e.to_string())
}
