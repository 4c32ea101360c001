//! Club Registry Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod mailer;
pub mod registry_store;
pub mod scheduler;
pub mod server;
pub mod server_store;
pub mod sqlite_persistence;
pub mod work_queue;

// Re-export commonly used types for convenience
pub use registry_store::{RegistrationStore, SqliteRegistrationStore};
pub use scheduler::{SchedulerHandle, TargetDate};
pub use server::{run_server, RequestsLoggingLevel, ServerState};
pub use server_store::{ServerStore, SqliteServerStore};
pub use work_queue::{SqliteWorkQueueStore, WorkQueueStore};
