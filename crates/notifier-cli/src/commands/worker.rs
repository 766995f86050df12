//! Delivery worker command.

use anyhow::Result;
use notifier_config::NotifierConfig;
use notifier_db::PgContentLookup;
use notifier_scheduler::{JobQueue, LogTransport, Worker};
use std::sync::Arc;
use tracing::{info, warn};

/// Deliver queued notifications until interrupted.
pub async fn run(config: &NotifierConfig) -> Result<()> {
    let pool = super::connect(config).await?;

    let worker = Worker::new(
        &config.worker,
        Arc::new(JobQueue::new(pool.clone())),
        Arc::new(PgContentLookup::new(pool)),
        Arc::new(LogTransport),
    );

    worker
        .run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down worker"),
                Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
            }
        })
        .await;
    Ok(())
}
