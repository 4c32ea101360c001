//! SQLite schema for the work queue database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const WORK_QUEUE_TABLE_V1: Table = Table {
    name: "work_queue",
    columns: &[
        sqlite_column!("id", SqlType::Text, is_primary_key = true),
        sqlite_column!("registration_id", SqlType::Text, non_null = true),
        sqlite_column!("status", SqlType::Text, non_null = true),
        sqlite_column!("attempts", SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("last_error", SqlType::Text),
        sqlite_column!("enqueued_at", SqlType::Integer, non_null = true),
        sqlite_column!("updated_at", SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_work_queue_status_enqueued", "status, enqueued_at"),
        ("idx_work_queue_registration", "registration_id"),
    ],
};

pub static WORK_QUEUE_VERSIONED_SCHEMAS: [VersionedSchema; 1] = [VersionedSchema {
    version: 1,
    tables: &[WORK_QUEUE_TABLE_V1],
    migration: None,
}];
