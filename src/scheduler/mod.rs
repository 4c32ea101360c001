//! Background job scheduling and the annual cancellation logic.

pub mod annual;
mod context;
mod handle;
mod job;
pub mod jobs;
mod scheduler;
mod settings;

pub use annual::{evaluate, Decision, LastRun, TargetDate};
pub use context::{Clock, JobContext, SystemClock};
pub use handle::{JobInfo, JobRunInfo, SchedulerHandle};
pub use job::{BackgroundJob, JobError, JobSchedule};
pub use scheduler::{create_scheduler, JobScheduler};
pub use settings::{CancellationSettings, CANCELLATION_DATE_KEY, LAST_RUN_KEY};
