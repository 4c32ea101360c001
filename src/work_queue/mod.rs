//! Durable work queue for asynchronous cancellation of registrations.
//!
//! The cancellation sweep enqueues one item per registration; a worker loop
//! claims items and applies the cancellation action independently of the
//! sweep, with bounded per-item retry.

mod models;
mod schema;
mod store;
mod worker;

pub use models::{QueueCounts, QueueItem, QueueStatus};
pub use schema::WORK_QUEUE_VERSIONED_SCHEMAS;
pub use store::{SqliteWorkQueueStore, WorkQueueStore};
pub use worker::{ActionError, CancellationAction, DeactivateRegistration, QueueWorker};
