//! Product lookups.

use async_trait::async_trait;
use notifier_core::{Content, ContentId, ContentLookup, Result, TenantId};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

/// A product row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub price: f64,
}

impl From<ProductRow> for Content {
    fn from(row: ProductRow) -> Self {
        Content {
            id: ContentId::from(row.id),
            name: row.name,
            categories: row.categories,
            tags: row.tags,
            price: row.price,
        }
    }
}

/// PostgreSQL implementation of ContentLookup.
pub struct PgContentLookup {
    pool: PgPool,
}

impl PgContentLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentLookup for PgContentLookup {
    async fn content(&self, tenant: &TenantId, id: &ContentId) -> Result<Content> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, categories, tags, price
            FROM products
            WHERE enterprise_id = $1 AND id = $2
            LIMIT 1
            "#,
        )
        .bind(tenant.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DbError::NotFound(format!("product {} of tenant {}", id, tenant)))?;
        Ok(row.into())
    }
}
