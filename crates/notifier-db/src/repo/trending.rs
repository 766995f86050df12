//! Trending product rankings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_core::{ContentId, Result, TenantId, TrendingEntry, TrendingIndex, TrendingList};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

/// A trending row as stored by the ranking job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrendingRow {
    pub enterprise_id: String,
    pub ts: DateTime<Utc>,
    pub product_id: String,
    pub rank: i32,
}

impl TryFrom<TrendingRow> for TrendingEntry {
    type Error = DbError;

    fn try_from(row: TrendingRow) -> DbResult<Self> {
        let rank = u32::try_from(row.rank)
            .ok()
            .filter(|r| *r > 0)
            .ok_or_else(|| {
                DbError::Malformed(format!(
                    "trending rank {} for product {} of tenant {}",
                    row.rank, row.product_id, row.enterprise_id
                ))
            })?;
        Ok(TrendingEntry {
            tenant_id: TenantId::from(row.enterprise_id),
            time_bucket: row.ts,
            content_id: ContentId::from(row.product_id),
            rank,
        })
    }
}

/// PostgreSQL implementation of TrendingIndex.
pub struct PgTrendingIndex {
    pool: PgPool,
}

impl PgTrendingIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, tenant: &TenantId, bucket: DateTime<Utc>) -> DbResult<Vec<TrendingRow>> {
        // Sorting by product id fixes the order of rank ties for a snapshot.
        let rows = sqlx::query_as::<_, TrendingRow>(
            r#"
            SELECT enterprise_id, ts, product_id, rank
            FROM trending_products
            WHERE enterprise_id = $1 AND ts = $2
            ORDER BY product_id
            "#,
        )
        .bind(tenant.as_str())
        .bind(bucket)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl TrendingIndex for PgTrendingIndex {
    async fn trending_for(
        &self,
        tenant: &TenantId,
        bucket: DateTime<Utc>,
    ) -> Result<TrendingList> {
        let entries = self
            .fetch(tenant, bucket)
            .await?
            .into_iter()
            .map(TrendingEntry::try_from)
            .collect::<DbResult<Vec<_>>>()?;
        Ok(TrendingList::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(rank: i32) -> TrendingRow {
        TrendingRow {
            enterprise_id: "acme".to_string(),
            ts: Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
            product_id: "p1".to_string(),
            rank,
        }
    }

    #[test]
    fn test_row_into_entry() {
        let entry = TrendingEntry::try_from(row(2)).unwrap();
        assert_eq!(entry.tenant_id.as_str(), "acme");
        assert_eq!(entry.content_id.as_str(), "p1");
        assert_eq!(entry.rank, 2);
    }

    #[test]
    fn test_non_positive_rank_is_malformed() {
        assert!(matches!(
            TrendingEntry::try_from(row(0)),
            Err(DbError::Malformed(_))
        ));
        assert!(matches!(
            TrendingEntry::try_from(row(-3)),
            Err(DbError::Malformed(_))
        ));
    }
}
