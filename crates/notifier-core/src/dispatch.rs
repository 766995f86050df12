//! Dispatch jobs and the pipeline they are handed to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ContentId, Result, TenantId, UserId};

/// The unit handed to the asynchronous delivery pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchJob {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub content_id: ContentId,
}

impl DispatchJob {
    pub fn new(user_id: UserId, tenant_id: TenantId, content_id: ContentId) -> Self {
        Self {
            user_id,
            tenant_id,
            content_id,
        }
    }
}

/// Accepts dispatch jobs for delivery.
///
/// `enqueue` returns only once the job is durably queued; otherwise it
/// fails with `EnqueueFailure`.
#[async_trait]
pub trait DispatchSink: Send + Sync {
    async fn enqueue(&self, job: &DispatchJob) -> Result<()>;
}

/// Proof that the holder owns the scheduling run. Dropping it releases
/// the lock.
pub struct RunLease {
    _inner: Box<dyn Send>,
}

impl RunLease {
    pub fn new(inner: impl Send + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl std::fmt::Debug for RunLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLease").finish_non_exhaustive()
    }
}

/// Cross-process guard so two deployments never run the same pass at once.
#[async_trait]
pub trait RunLock: Send + Sync {
    /// `Ok(None)` when another holder currently owns the run.
    async fn try_acquire(&self) -> Result<Option<RunLease>>;
}
