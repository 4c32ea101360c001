//! In-memory registration store for tests and deterministic sweeps without
//! a database file.

use super::models::{ClubRegistration, NewClubRegistration};
use super::RegistrationStore;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryRegistrationStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, ClubRegistration>,
    // Insertion order, since HashMap iteration order is unstable.
    order: Vec<String>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistrationStore for MemoryRegistrationStore {
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
        let mut inner = self.inner.lock().unwrap();
        inner.order.push(record.id.clone());
        inner.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<ClubRegistration>> {
        Ok(self.inner.lock().unwrap().records.get(id).cloned())
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ClubRegistration>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.inner.lock().unwrap().order.clone())
    }

    fn set_approved(&self, id: &str, approved: bool) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.records.get_mut(id) {
            Some(record) => {
                record.approved = approved;
                record.updated_at = Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.inner.lock().unwrap().records.len())
    }
}
