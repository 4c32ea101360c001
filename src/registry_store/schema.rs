//! SQLite schema for the club registration database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const REGISTRATIONS_TABLE_V1: Table = Table {
    name: "club_registrations",
    columns: &[
        sqlite_column!("id", SqlType::Text, is_primary_key = true),
        sqlite_column!("club_name", SqlType::Text, non_null = true),
        sqlite_column!("contact_email", SqlType::Text, non_null = true),
        sqlite_column!("approved", SqlType::Integer, non_null = true, default_value = Some("1")),
        sqlite_column!("created_at", SqlType::Integer, non_null = true),
        sqlite_column!("updated_at", SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_club_registrations_created", "created_at"),
        ("idx_club_registrations_approved", "approved"),
    ],
};

pub static REGISTRY_VERSIONED_SCHEMAS: [VersionedSchema; 1] = [VersionedSchema {
    version: 1,
    tables: &[REGISTRATIONS_TABLE_V1],
    migration: None,
}];
