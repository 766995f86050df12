//! Notification eligibility by time of day.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::{Result, TenantId, UserId};

/// Resolves which users want a notification at a recurring time of day.
#[async_trait]
pub trait EligibilityIndex: Send + Sync {
    /// Users of `tenant` scheduled for `time_of_day` (HHMM). Duplicates are
    /// collapsed, so each user appears at most once.
    async fn users_for(&self, tenant: &TenantId, time_of_day: u32) -> Result<BTreeSet<UserId>>;
}
