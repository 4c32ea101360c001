use crate::registry_store::RegistrationStore;
use crate::server_store::ServerStore;
use crate::work_queue::WorkQueueStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Source of "today" for date-driven jobs, injectable so tests can pin the
/// calendar.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's UTC time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

/// Context provided to jobs during execution.
///
/// Contains references to shared resources and a cancellation token
/// for graceful shutdown handling.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Access to club registrations.
    pub registrations: Arc<dyn RegistrationStore>,

    /// Access to server-side state (settings, job history, schedules).
    pub server_store: Arc<dyn ServerStore>,

    /// Durable queue of pending cancellation work.
    pub work_queue: Arc<dyn WorkQueueStore>,

    /// Calendar source for date comparisons.
    pub clock: Arc<dyn Clock>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        registrations: Arc<dyn RegistrationStore>,
        server_store: Arc<dyn ServerStore>,
        work_queue: Arc<dyn WorkQueueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cancellation_token,
            registrations,
            server_store,
            work_queue,
            clock,
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
