mod cancellation_sweep;

pub use cancellation_sweep::{CancellationSweep, CANCELLATION_SWEEP_JOB_ID};
