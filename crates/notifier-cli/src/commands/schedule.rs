//! Scheduling pass commands.

use anyhow::{Context, Result};
use notifier_config::NotifierConfig;
use notifier_db::{PgEligibilityIndex, PgRunLock, PgTenantRegistry, PgTrendingIndex};
use notifier_scheduler::{JobQueue, Scheduler};
use std::sync::Arc;
use tracing::info;

async fn build_scheduler(config: &NotifierConfig) -> Result<Scheduler> {
    let pool = super::connect_with(config, config.scheduler_pool_size()).await?;
    let run_lock = PgRunLock::connect(&config.database.url, config.database.connect_timeout)
        .await
        .context("Failed to open run lock connection")?;

    let scheduler = Scheduler::new(
        Arc::new(PgTenantRegistry::new(pool.clone())),
        Arc::new(PgTrendingIndex::new(pool.clone())),
        Arc::new(PgEligibilityIndex::new(pool.clone())),
        Arc::new(JobQueue::new(pool)),
        config.scheduler.clone(),
    )
    .context("Invalid scheduler configuration")?
    .with_run_lock(Arc::new(run_lock));

    Ok(scheduler)
}

/// Run one scheduling pass and exit.
pub async fn run_once(config: &NotifierConfig) -> Result<()> {
    let scheduler = build_scheduler(config).await?;
    let report = scheduler.run().await.context("Scheduling run aborted")?;

    println!(
        "Enqueued {} job(s) across {} tenant(s) ({} failed, {} without trending content, {} job(s) dropped)",
        report.jobs_enqueued,
        report.tenants,
        report.tenants_failed,
        report.tenants_without_trending,
        report.jobs_dropped
    );
    Ok(())
}

/// Run scheduling passes until interrupted.
pub async fn serve(config: &NotifierConfig) -> Result<()> {
    let scheduler = build_scheduler(config).await?;

    tokio::select! {
        _ = scheduler.serve() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutting down scheduler");
        }
    }
    Ok(())
}
