//! SQLite schema for the server state database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

/// History of background job executions.
const JOB_RUNS_TABLE_V1: Table = Table {
    name: "job_runs",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true), // AUTOINCREMENT
        sqlite_column!("job_id", SqlType::Text, non_null = true),
        sqlite_column!("started_at", SqlType::Integer, non_null = true),
        sqlite_column!("finished_at", SqlType::Integer),
        sqlite_column!("status", SqlType::Text, non_null = true),
        sqlite_column!("error_message", SqlType::Text),
        sqlite_column!("triggered_by", SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_job_runs_job_id_started", "job_id, started_at DESC"),
        ("idx_job_runs_status", "status"),
    ],
};

/// Next run times for interval-scheduled jobs.
const JOB_SCHEDULES_TABLE_V1: Table = Table {
    name: "job_schedules",
    columns: &[
        sqlite_column!("job_id", SqlType::Text, is_primary_key = true),
        sqlite_column!("next_run_at", SqlType::Integer, non_null = true),
        sqlite_column!("last_run_at", SqlType::Integer),
    ],
    indices: &[],
};

/// Key-value store for server settings (cancellation target date, last
/// firing record).
const SERVER_STATE_TABLE_V1: Table = Table {
    name: "server_state",
    columns: &[
        sqlite_column!("key", SqlType::Text, is_primary_key = true),
        sqlite_column!("value", SqlType::Text, non_null = true),
        sqlite_column!(
            "updated_at",
            SqlType::Integer,
            non_null = true,
            default_value = Some("(cast(strftime('%s','now') as int))")
        ),
    ],
    indices: &[],
};

pub static SERVER_VERSIONED_SCHEMAS: [VersionedSchema; 1] = [VersionedSchema {
    version: 1,
    tables: &[
        JOB_RUNS_TABLE_V1,
        JOB_SCHEDULES_TABLE_V1,
        SERVER_STATE_TABLE_V1,
    ],
    migration: None,
}];
