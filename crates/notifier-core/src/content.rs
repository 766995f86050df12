//! Content display attributes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ContentId, Result, TenantId};

/// What a notification needs to describe a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub name: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub price: f64,
}

/// Point lookup of content by tenant and id.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// Fails with `NotFound` when the tenant has no such content.
    async fn content(&self, tenant: &TenantId, id: &ContentId) -> Result<Content>;
}
