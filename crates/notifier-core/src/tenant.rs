//! Tenant enumeration.

use async_trait::async_trait;

use crate::{Result, TenantId};

/// Lists the tenants currently known to the platform.
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    /// Re-read on every run; fails with `StoreUnavailable` when the
    /// backing store cannot be reached.
    async fn list_tenants(&self) -> Result<Vec<TenantId>>;
}
