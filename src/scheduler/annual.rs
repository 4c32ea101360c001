//! Annual trigger evaluation for the cancellation sweep.
//!
//! Decides, once per daily tick, whether the yearly cancellation action should
//! fire. The decision is a pure function over the configured target date, the
//! record of the last firing, and today's date; all storage and dispatch is
//! the caller's concern.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The (month, day) an administrator configured for automatic cancellation.
///
/// There is no year field: the same calendar date fires every year. A target
/// of Feb 29 only matches in leap years and silently never fires otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDate {
    pub month: u32,
    pub day: u32,
}

impl TargetDate {
    /// Check the month is 1-12 and the day is 1-31.
    ///
    /// Days that don't exist in the given month (e.g. Apr 31) are accepted
    /// here and simply never match.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }
}

impl std::fmt::Display for TargetDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// The calendar date of the most recent successful firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl LastRun {
    /// The record to store after firing on `today` for `target`.
    pub fn from_fire(today: NaiveDate, target: &TargetDate) -> Self {
        Self {
            year: today.year(),
            month: target.month,
            day: target.day,
        }
    }
}

/// Outcome of one daily tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Fire,
}

/// Decide whether the annual action should fire today.
///
/// Fires when today matches the target (month, day) and no firing has been
/// recorded for this year yet. A last run dated in a future year is treated
/// as already handled rather than as an error, so a clock anomaly cannot
/// cause repeated firings.
pub fn evaluate(
    today: NaiveDate,
    target: Option<&TargetDate>,
    last_run: Option<&LastRun>,
) -> Decision {
    let target = match target {
        Some(target) => target,
        None => return Decision::Skip,
    };

    if today.month() != target.month || today.day() != target.day {
        return Decision::Skip;
    }

    if let Some(last_run) = last_run {
        if last_run.year >= today.year()
            && last_run.month == target.month
            && last_run.day == target.day
        {
            // Already fired this year (or in a "future" year after a clock
            // anomaly).
            return Decision::Skip;
        }
    }

    Decision::Fire
}
