#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobRunStatus {
    Running,
    Completed,
    Failed,
}

impl JobRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobRunStatus::Running => "running",
            JobRunStatus::Completed => "completed",
            JobRunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(JobRunStatus::Running),
            "completed" => Some(JobRunStatus::Completed),
            "failed" => Some(JobRunStatus::Failed),
            _ => None,
        }
    }
}

/// One recorded execution of a background job.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub id: i64,
    pub job_id: String,
    /// Unix timestamp.
    pub started_at: i64,
    /// Unix timestamp, absent while the run is in flight.
    pub finished_at: Option<i64>,
    pub status: JobRunStatus,
    pub error_message: Option<String>,
    /// What caused the run: "schedule" or "manual".
    pub triggered_by: String,
}

/// Next/last run bookkeeping for interval-scheduled jobs.
#[derive(Debug, Clone)]
pub struct JobScheduleState {
    pub job_id: String,
    /// Unix timestamp of the next due run.
    pub next_run_at: i64,
    /// Unix timestamp of the last completed run, if any.
    pub last_run_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_run_status_round_trip() {
        for status in [
            JobRunStatus::Running,
            JobRunStatus::Completed,
            JobRunStatus::Failed,
        ] {
            assert_eq!(JobRunStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobRunStatus::parse("bogus"), None);
    }
}
