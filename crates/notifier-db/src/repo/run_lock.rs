//! Cross-process run serialization.

use async_trait::async_trait;
use notifier_core::{Result, RunLease, RunLock};
use sqlx::PgPool;
use std::time::Duration;

use crate::{DbError, DbResult};

/// Advisory lock key shared by every scheduler deployment on a database.
pub const SCHEDULER_LOCK_KEY: i64 = 0x6e6f_7469_6679;

/// Run lock backed by a transaction-scoped PostgreSQL advisory lock.
///
/// The lease owns the open transaction; dropping it rolls back, which
/// releases the lock. The transaction pins a connection for the whole run,
/// so the lock should sit on its own pool rather than the query pool.
pub struct PgRunLock {
    pool: PgPool,
    key: i64,
}

impl PgRunLock {
    pub fn new(pool: PgPool) -> Self {
        Self::with_key(pool, SCHEDULER_LOCK_KEY)
    }

    pub fn with_key(pool: PgPool, key: i64) -> Self {
        Self { pool, key }
    }

    /// Open a single-connection pool dedicated to the lock.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> DbResult<Self> {
        let pool = crate::create_pool(database_url, 1, acquire_timeout).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RunLock for PgRunLock {
    async fn try_acquire(&self) -> Result<Option<RunLease>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_xact_lock($1)")
            .bind(self.key)
            .fetch_one(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if acquired {
            Ok(Some(RunLease::new(tx)))
        } else {
            tx.rollback().await.map_err(DbError::from)?;
            Ok(None)
        }
    }
}
