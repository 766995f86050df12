//! Push delivery transport.
//!
//! Resolving device tokens and talking to the device platforms happens
//! behind this seam.

use async_trait::async_trait;
use notifier_core::{ContentId, Result, TenantId, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A composed notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub content_id: ContentId,
    pub text: String,
}

#[async_trait]
pub trait PushTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &PushMessage) -> Result<()>;
}

/// Transport that records each message in the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl PushTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &PushMessage) -> Result<()> {
        info!(
            user = %message.user_id,
            tenant = %message.tenant_id,
            content = %message.content_id,
            text = %message.text,
            "Push notification"
        );
        Ok(())
    }
}
