//! Scheduling pass - decides who gets notified about what, right now.
//!
//! One pass:
//! 1. Floor `now` to the trending bucket ("what is trending right now").
//! 2. Ceil `now` and take its local time of day ("whose slot is next").
//! 3. List tenants; a failure here aborts the pass.
//! 4. Load trending content and eligible users per tenant, concurrently.
//!    A tenant whose load fails or times out is skipped.
//! 5. Pick one content id per eligible user of every tenant that has
//!    trending content and enqueue the job. Enqueue failures drop the job.

use chrono::{DateTime, FixedOffset, Utc};
use futures::{StreamExt, stream};
use notifier_config::SchedulerConfig;
use notifier_core::time_window::{self, utc_offset};
use notifier_core::{
    ContentSelector, DispatchJob, DispatchSink, EligibilityIndex, Error, Result, RunLease,
    RunLock, TenantId, TenantRegistry, TrendingIndex, TrendingList, UserId,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub trend_bucket: DateTime<Utc>,
    pub time_of_day: u32,
    pub tenants: usize,
    pub tenants_failed: usize,
    pub tenants_without_trending: usize,
    pub jobs_enqueued: usize,
    pub jobs_dropped: usize,
}

/// Data loaded for one tenant.
struct TenantSnapshot {
    trending: TrendingList,
    eligible: BTreeSet<UserId>,
}

/// Runs scheduling passes against injected collaborators.
pub struct Scheduler {
    tenants: Arc<dyn TenantRegistry>,
    trending: Arc<dyn TrendingIndex>,
    eligibility: Arc<dyn EligibilityIndex>,
    sink: Arc<dyn DispatchSink>,
    selector: Box<dyn ContentSelector>,
    run_lock: Option<Arc<dyn RunLock>>,
    config: SchedulerConfig,
    utc_offset: FixedOffset,
    /// Held for the whole pass, so it also keeps passes from overlapping.
    rng: Mutex<StdRng>,
}

impl Scheduler {
    pub fn new(
        tenants: Arc<dyn TenantRegistry>,
        trending: Arc<dyn TrendingIndex>,
        eligibility: Arc<dyn EligibilityIndex>,
        sink: Arc<dyn DispatchSink>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        let utc_offset = utc_offset(config.utc_offset_minutes)?;
        Ok(Self {
            tenants,
            trending,
            eligibility,
            sink,
            selector: config.selection.selector(),
            run_lock: None,
            config,
            utc_offset,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Use a specific random source, e.g. a seeded one for reproducible runs.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Override the selection policy from the configuration.
    pub fn with_selector(mut self, selector: Box<dyn ContentSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Serialize passes across processes as well as within this one.
    pub fn with_run_lock(mut self, lock: Arc<dyn RunLock>) -> Self {
        self.run_lock = Some(lock);
        self
    }

    /// Run one pass at the current time.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass as of `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let Ok(mut rng) = self.rng.try_lock() else {
            warn!("Previous scheduling run still in progress, skipping");
            return Err(Error::RunInProgress);
        };
        let _lease = self.acquire_lease().await?;

        let bucket_minutes = self.config.bucket_minutes;
        let trend_bucket = time_window::floor(now, bucket_minutes)?;
        let slot = time_window::ceil(now, bucket_minutes)?.with_timezone(&self.utc_offset);
        let time_of_day = time_window::decompose(&slot).time_of_day;

        info!(%now, %trend_bucket, time_of_day, "Starting scheduling run");

        let tenants = self
            .with_query_timeout("list tenants", self.tenants.list_tenants())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to list tenants, aborting run"))?;
        let tenants = distinct_tenants(tenants);

        let mut report = RunReport {
            trend_bucket,
            time_of_day,
            tenants: tenants.len(),
            tenants_failed: 0,
            tenants_without_trending: 0,
            jobs_enqueued: 0,
            jobs_dropped: 0,
        };

        // `buffered` keeps tenant order so a seeded run is reproducible.
        let loads: Vec<(TenantId, Result<TenantSnapshot>)> = stream::iter(tenants)
            .map(|tenant| async move {
                let loaded = self.load_tenant(&tenant, trend_bucket, time_of_day).await;
                (tenant, loaded)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut jobs = Vec::new();
        for (tenant, loaded) in loads {
            match loaded {
                Err(e) => {
                    warn!(tenant = %tenant, error = %e, "Skipping tenant for this run");
                    report.tenants_failed += 1;
                }
                Ok(snapshot) if snapshot.trending.is_empty() => {
                    debug!(
                        tenant = %tenant,
                        eligible = snapshot.eligible.len(),
                        "No trending content, skipping tenant"
                    );
                    report.tenants_without_trending += 1;
                }
                Ok(snapshot) => {
                    let before = jobs.len();
                    select_jobs(&tenant, &snapshot, self.selector.as_ref(), &mut *rng, &mut jobs);
                    debug!(tenant = %tenant, jobs = jobs.len() - before, "Selected content");
                }
            }
        }

        let outcomes: Vec<Result<()>> = stream::iter(&jobs)
            .map(|job| self.enqueue(job))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        for outcome in outcomes {
            match outcome {
                Ok(()) => report.jobs_enqueued += 1,
                Err(e) => {
                    warn!(error = %e, "Dropping dispatch job for this run");
                    report.jobs_dropped += 1;
                }
            }
        }

        info!(
            tenants = report.tenants,
            tenants_failed = report.tenants_failed,
            tenants_without_trending = report.tenants_without_trending,
            jobs_enqueued = report.jobs_enqueued,
            jobs_dropped = report.jobs_dropped,
            "Scheduling run completed"
        );

        Ok(report)
    }

    /// Run passes on the configured cadence until the task is dropped.
    /// A failed pass is logged and does not stop the loop.
    pub async fn serve(&self) {
        let mut tick = tokio::time::interval(self.config.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval = ?self.config.interval, "Starting scheduler");

        loop {
            tick.tick().await;
            if let Err(e) = self.run().await {
                error!(error = %e, "Scheduling run failed");
            }
        }
    }

    async fn acquire_lease(&self) -> Result<Option<RunLease>> {
        let Some(lock) = &self.run_lock else {
            return Ok(None);
        };
        match self
            .with_query_timeout("acquire run lock", lock.try_acquire())
            .await?
        {
            Some(lease) => Ok(Some(lease)),
            None => {
                warn!("Scheduling run held by another process, skipping");
                Err(Error::RunInProgress)
            }
        }
    }

    async fn load_tenant(
        &self,
        tenant: &TenantId,
        trend_bucket: DateTime<Utc>,
        time_of_day: u32,
    ) -> Result<TenantSnapshot> {
        let (trending, eligible) = tokio::try_join!(
            self.with_query_timeout(
                "fetch trending",
                self.trending.trending_for(tenant, trend_bucket)
            ),
            self.with_query_timeout(
                "fetch eligible users",
                self.eligibility.users_for(tenant, time_of_day)
            ),
        )?;
        debug!(
            tenant = %tenant,
            trending = ?trending.items(),
            eligible = eligible.len(),
            "Loaded tenant"
        );
        Ok(TenantSnapshot { trending, eligible })
    }

    async fn enqueue(&self, job: &DispatchJob) -> Result<()> {
        let timeout = self.config.enqueue_timeout;
        match tokio::time::timeout(timeout, self.sink.enqueue(job)).await {
            Ok(result) => result,
            Err(_) => Err(Error::EnqueueFailure(format!(
                "enqueue for user {} of tenant {} exceeded {:?}",
                job.user_id, job.tenant_id, timeout
            ))),
        }
    }

    async fn with_query_timeout<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.query_timeout;
        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| Error::QueryTimeout(format!("{what} exceeded {timeout:?}")))?
    }
}

/// Drop repeated tenant ids, keeping first-seen order.
fn distinct_tenants(tenants: Vec<TenantId>) -> Vec<TenantId> {
    let mut seen = HashSet::new();
    tenants
        .into_iter()
        .filter(|tenant| {
            let first = seen.insert(tenant.clone());
            if !first {
                warn!(tenant = %tenant, "Tenant listed more than once, ignoring repeat");
            }
            first
        })
        .collect()
}

/// One job per eligible user, each advertising a content id picked from
/// the tenant's trending list.
fn select_jobs(
    tenant: &TenantId,
    snapshot: &TenantSnapshot,
    selector: &dyn ContentSelector,
    rng: &mut dyn RngCore,
    jobs: &mut Vec<DispatchJob>,
) {
    for user in &snapshot.eligible {
        if let Some(content) = selector.select(&snapshot.trending, rng) {
            jobs.push(DispatchJob::new(user.clone(), tenant.clone(), content.clone()));
        }
    }
}
