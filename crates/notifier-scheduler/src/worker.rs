//! Worker that delivers jobs from the dispatch queue.

use crate::composer::MessageComposer;
use crate::queue::JobSource;
use crate::transport::{PushMessage, PushTransport};
use futures::FutureExt;
use notifier_config::WorkerConfig;
use notifier_core::{ContentLookup, DispatchJob, Error, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

/// A worker that claims dispatch jobs, composes the message and pushes it.
pub struct Worker {
    id: String,
    queue: Arc<dyn JobSource>,
    content: Arc<dyn ContentLookup>,
    transport: Arc<dyn PushTransport>,
    composer: MessageComposer,
    rng: Mutex<StdRng>,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl Worker {
    pub fn new(
        config: &WorkerConfig,
        queue: Arc<dyn JobSource>,
        content: Arc<dyn ContentLookup>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            id: config.id.clone(),
            queue,
            content,
            transport,
            composer: MessageComposer::new(),
            rng: Mutex::new(StdRng::from_entropy()),
            poll_interval: config.poll_interval,
            error_backoff: config.error_backoff,
        }
    }

    pub fn with_composer(mut self, composer: MessageComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Run the worker loop forever.
    pub async fn run(&self) {
        self.run_until(std::future::pending()).await
    }

    /// Run the worker loop until `shutdown` resolves.
    ///
    /// A job whose delivery is still in flight when shutdown fires is
    /// released back to pending so another worker picks it up.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        info!(worker_id = %self.id, transport = self.transport.name(), "Starting worker");
        tokio::pin!(shutdown);

        loop {
            if (&mut shutdown).now_or_never().is_some() {
                break;
            }

            match self.queue.claim(&self.id).await {
                Ok(Some(queued)) => {
                    let job = queued.dispatch_job();
                    info!(job_id = %queued.id, user = %job.user_id, tenant = %job.tenant_id, "Claimed job");

                    let delivered = tokio::select! {
                        _ = &mut shutdown => {
                            info!(job_id = %queued.id, "Shutdown during delivery, releasing job");
                            if let Err(e) = self.queue.release(queued.id).await {
                                warn!(job_id = %queued.id, error = %e, "Failed to release job");
                            }
                            break;
                        }
                        delivered = self.deliver(&job) => delivered,
                    };

                    let outcome = match delivered {
                        Ok(_) => self.queue.complete(queued.id).await,
                        Err(e) => {
                            warn!(job_id = %queued.id, error = %e, "Delivery failed");
                            self.queue.fail(queued.id, &e.to_string()).await
                        }
                    };
                    if let Err(e) = outcome {
                        warn!(job_id = %queued.id, error = %e, "Failed to record job outcome");
                    }
                }
                Ok(None) => {
                    // No jobs available, wait before polling again
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = sleep(self.poll_interval) => {}
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to claim job");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = sleep(self.error_backoff) => {}
                    }
                }
            }
        }

        info!(worker_id = %self.id, "Worker stopped");
    }

    /// Compose and push the notification for one job.
    pub async fn deliver(&self, job: &DispatchJob) -> Result<PushMessage> {
        let content = self.content.content(&job.tenant_id, &job.content_id).await?;

        let text = {
            let mut rng = self.rng.lock().await;
            self.composer.compose(&content, &mut *rng)
        }
        .ok_or_else(|| Error::Internal("no message templates configured".to_string()))?;

        let message = PushMessage {
            user_id: job.user_id.clone(),
            tenant_id: job.tenant_id.clone(),
            content_id: job.content_id.clone(),
            text,
        };
        self.transport.send(&message).await?;
        Ok(message)
    }
}
