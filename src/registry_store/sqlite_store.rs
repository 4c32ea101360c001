use super::models::{ClubRegistration, NewClubRegistration};
use super::schema::REGISTRY_VERSIONED_SCHEMAS;
use super::RegistrationStore;
use crate::sqlite_persistence::open_database;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct SqliteRegistrationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRegistrationStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_database(db_path, &REGISTRY_VERSIONED_SCHEMAS)
            .context("Failed to open registration database")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_registration(row: &rusqlite::Row) -> rusqlite::Result<ClubRegistration> {
        let approved: i64 = row.get("approved")?;
        Ok(ClubRegistration {
            id: row.get("id")?,
            club_name: row.get("club_name")?,
            contact_email: row.get("contact_email")?,
            approved: approved != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl RegistrationStore for SqliteRegistrationStore {
    fn insert(&self, registration: NewClubRegistration) -> Result<ClubRegistration> {
        let now = Utc::now().timestamp();
        let record = ClubRegistration {
            id: uuid::Uuid::new_v4().to_string(),
            club_name: registration.club_name,
            contact_email: registration.contact_email,
            approved: true,
            created_at: now,
            updated_at: now,
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO club_registrations (id, club_name, contact_email, approved, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.club_name,
                record.contact_email,
                record.approved as i64,
                record.created_at,
                record.updated_at,
            ],
        )
        .context("Failed to insert registration")?;
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<ClubRegistration>> {
        let conn = self.conn.lock().unwrap();
        let registration = conn
            .query_row(
                "SELECT * FROM club_registrations WHERE id = ?1",
                params![id],
                Self::row_to_registration,
            )
            .optional()?;
        Ok(registration)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ClubRegistration>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM club_registrations ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit, offset], Self::row_to_registration)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id FROM club_registrations ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn set_approved(&self, id: &str, approved: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE club_registrations SET approved = ?1, updated_at = ?2 WHERE id = ?3",
            params![approved as i64, Utc::now().timestamp(), id],
        )?;
        Ok(updated > 0)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM club_registrations", [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }
}
