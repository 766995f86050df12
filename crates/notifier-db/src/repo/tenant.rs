//! Tenant registry.

use async_trait::async_trait;
use notifier_core::{Result, TenantId, TenantRegistry};
use sqlx::PgPool;

use crate::DbError;

/// PostgreSQL implementation of TenantRegistry, backed by the consumer
/// registry table.
pub struct PgTenantRegistry {
    pool: PgPool,
}

impl PgTenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRegistry for PgTenantRegistry {
    async fn list_tenants(&self) -> Result<Vec<TenantId>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM consumers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(ids.into_iter().map(TenantId::from).collect())
    }
}
