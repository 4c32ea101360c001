use crate::scheduler::annual::{evaluate, Decision, LastRun};
use crate::scheduler::context::JobContext;
use crate::scheduler::job::{BackgroundJob, JobError, JobSchedule};
use crate::scheduler::settings::CancellationSettings;
use crate::work_queue::QueueItem;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const CANCELLATION_SWEEP_JOB_ID: &str = "cancellation_sweep";

/// Daily job that checks whether the configured annual cancellation date has
/// arrived and, if so, enqueues a cancellation work item for every club
/// registration.
///
/// Enqueueing and recording the firing are deliberately not transactional:
/// queue items are idempotent to apply, so after a crash between the two a
/// re-run on the same day at worst enqueues duplicates that re-clear an
/// already cleared flag.
pub struct CancellationSweep {
    tick_interval: Duration,
}

impl CancellationSweep {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

impl BackgroundJob for CancellationSweep {
    fn id(&self) -> &'static str {
        CANCELLATION_SWEEP_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Cancellation sweep"
    }

    fn description(&self) -> &'static str {
        "Cancels all club registrations on the configured annual date"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.tick_interval)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let settings = CancellationSettings::new(Arc::clone(&ctx.server_store));
        let today = ctx.clock.today();

        let target = settings
            .target_date()
            .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;
        let last_run = settings
            .last_run()
            .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;

        let target = match target {
            Some(target) => target,
            None => {
                info!("Cancellation sweep: no target date configured");
                return Ok(());
            }
        };

        match evaluate(today, Some(&target), last_run.as_ref()) {
            Decision::Skip => {
                info!("Cancellation sweep: nothing to do on {}", today);
                return Ok(());
            }
            Decision::Fire => {}
        }

        info!(
            "Cancellation sweep firing: today {} matches target {}",
            today, target
        );

        let ids = ctx
            .registrations
            .list_ids()
            .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;

        let mut enqueued = 0usize;
        for id in ids {
            if ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            let already_queued = ctx
                .work_queue
                .is_actively_queued(&id)
                .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;
            if already_queued {
                continue;
            }
            ctx.work_queue
                .enqueue(QueueItem::cancellation(&id))
                .map_err(|e| JobError::ExecutionFailed(format!("{:#}", e)))?;
            info!("Queued cancellation for registration {}", id);
            enqueued += 1;
        }

        info!("Cancellation sweep queued {} registrations", enqueued);

        // Best effort: if this fails the sweep may fire again today, which the
        // idempotent queue items absorb.
        if let Err(e) = settings.set_last_run(&LastRun::from_fire(today, &target)) {
            warn!("Failed to record cancellation sweep run: {:#}", e);
        }

        Ok(())
    }
}
