//! Storage for club registration records.

mod memory_store;
mod models;
mod schema;
mod sqlite_store;

pub use memory_store::MemoryRegistrationStore;
pub use models::{ClubRegistration, NewClubRegistration};
pub use schema::REGISTRY_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteRegistrationStore;

use anyhow::Result;

/// Access to club registration records.
///
/// The annual cancellation sweep only enumerates ids and clears the approval
/// flag; the admin API uses the full record.
pub trait RegistrationStore: Send + Sync {
    fn insert(&self, registration: NewClubRegistration) -> Result<ClubRegistration>;
    fn get(&self, id: &str) -> Result<Option<ClubRegistration>>;
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ClubRegistration>>;
    /// Ids of every registration, oldest first.
    fn list_ids(&self) -> Result<Vec<String>>;
    /// Set the approval flag. Returns false if the record does not exist.
    /// Setting a flag to its current value is a no-op.
    fn set_approved(&self, id: &str, approved: bool) -> Result<bool>;
    fn count(&self) -> Result<usize>;
}
