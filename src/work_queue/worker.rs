//! Queue worker: drains the work queue and applies the cancellation action.

use super::store::WorkQueueStore;
use crate::registry_store::RegistrationStore;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("registration {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The per-item action applied by the worker.
///
/// Each invocation is independent; the worker, not the action, decides about
/// retries.
#[async_trait::async_trait]
pub trait CancellationAction: Send + Sync {
    async fn apply(&self, registration_id: &str) -> Result<(), ActionError>;
}

/// Production action: clear the approval flag on the backing record.
///
/// Re-deactivating an already-deactivated registration is a no-op, so a
/// double-fire of the sweep on the same day is harmless.
pub struct DeactivateRegistration {
    registrations: Arc<dyn RegistrationStore>,
}

impl DeactivateRegistration {
    pub fn new(registrations: Arc<dyn RegistrationStore>) -> Self {
        Self { registrations }
    }
}

#[async_trait::async_trait]
impl CancellationAction for DeactivateRegistration {
    async fn apply(&self, registration_id: &str) -> Result<(), ActionError> {
        let found = self.registrations.set_approved(registration_id, false)?;
        if !found {
            return Err(ActionError::NotFound(registration_id.to_string()));
        }
        debug!("Deactivated registration {}", registration_id);
        Ok(())
    }
}

/// Polling worker that drains the queue until shut down.
pub struct QueueWorker {
    queue: Arc<dyn WorkQueueStore>,
    action: Arc<dyn CancellationAction>,
    poll_interval: Duration,
    max_attempts: u32,
    shutdown: CancellationToken,
}

impl QueueWorker {
    pub fn new(
        queue: Arc<dyn WorkQueueStore>,
        action: Arc<dyn CancellationAction>,
        poll_interval: Duration,
        max_attempts: u32,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            action,
            poll_interval,
            max_attempts: max_attempts.max(1),
            shutdown,
        }
    }

    pub async fn run(self) {
        info!(
            "Queue worker started (poll interval {:?}, max {} attempts per item)",
            self.poll_interval, self.max_attempts
        );

        // A crash between claim and completion leaves items in IN_PROGRESS.
        // Nothing else is claiming, so anything in that state at startup is
        // orphaned work.
        match self.queue.requeue_stale(0) {
            Ok(count) if count > 0 => {
                info!("Requeued {} stale in-progress items from previous run", count);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to requeue stale queue items: {:#}", e);
            }
        }

        loop {
            self.drain().await;
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.cancelled() => {
                    info!("Queue worker stopped");
                    return;
                }
            }
        }
    }

    /// Process claimable items until the queue is empty or shutdown is
    /// requested. The item claimed when shutdown arrives is still finished.
    async fn drain(&self) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            let item = match self.queue.claim_next() {
                Ok(Some(item)) => item,
                Ok(None) => return,
                Err(e) => {
                    error!("Failed to claim next queue item: {:#}", e);
                    return;
                }
            };

            match self.action.apply(&item.registration_id).await {
                Ok(()) => {
                    info!(
                        "Cancelled registration {} (queue item {})",
                        item.registration_id, item.id
                    );
                    if let Err(e) = self.queue.mark_completed(&item.id) {
                        error!("Failed to mark queue item {} completed: {:#}", item.id, e);
                    }
                }
                Err(action_error) => {
                    let message = action_error.to_string();
                    let result = if item.attempts >= self.max_attempts {
                        warn!(
                            "Giving up on queue item {} after {} attempts: {}",
                            item.id, item.attempts, message
                        );
                        self.queue.mark_failed(&item.id, &message)
                    } else {
                        warn!(
                            "Attempt {} for queue item {} failed, will retry: {}",
                            item.attempts, item.id, message
                        );
                        self.queue.mark_retry(&item.id, &message)
                    };
                    if let Err(e) = result {
                        error!("Failed to update queue item {}: {:#}", item.id, e);
                    }
                }
            }
        }
    }
}
