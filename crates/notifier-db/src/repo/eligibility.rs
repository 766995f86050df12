//! Notification time slots.

use async_trait::async_trait;
use notifier_core::{EligibilityIndex, Result, TenantId, UserId};
use sqlx::PgPool;
use std::collections::BTreeSet;

use crate::DbError;

/// PostgreSQL implementation of EligibilityIndex.
pub struct PgEligibilityIndex {
    pool: PgPool,
}

impl PgEligibilityIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EligibilityIndex for PgEligibilityIndex {
    async fn users_for(&self, tenant: &TenantId, time_of_day: u32) -> Result<BTreeSet<UserId>> {
        let time_of_day = i32::try_from(time_of_day).map_err(|_| {
            notifier_core::Error::InvalidInput(format!("time of day {time_of_day}"))
        })?;
        let users: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM notification_time_slots
            WHERE enterprise_id = $1 AND time_of_day = $2
            "#,
        )
        .bind(tenant.as_str())
        .bind(time_of_day)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(users.into_iter().map(UserId::from).collect())
    }
}
