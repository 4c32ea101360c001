use super::annual::{LastRun, TargetDate};
use crate::server_store::ServerStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

pub const CANCELLATION_DATE_KEY: &str = "club_cancellation_date";
pub const LAST_RUN_KEY: &str = "cancellation_last_run";

/// Typed accessors for the cancellation settings stored in the server state
/// key-value table.
///
/// A corrupt stored value is logged and treated as absent rather than
/// propagated, so a bad write can never wedge the sweep.
#[derive(Clone)]
pub struct CancellationSettings {
    store: Arc<dyn ServerStore>,
}

impl CancellationSettings {
    pub fn new(store: Arc<dyn ServerStore>) -> Self {
        Self { store }
    }

    pub fn target_date(&self) -> Result<Option<TargetDate>> {
        Ok(self.read_json(CANCELLATION_DATE_KEY)?)
    }

    pub fn set_target_date(&self, target: &TargetDate) -> Result<()> {
        let value = serde_json::to_string(target).context("Failed to serialize target date")?;
        self.store.set_state(CANCELLATION_DATE_KEY, &value)
    }

    pub fn clear_target_date(&self) -> Result<()> {
        self.store.delete_state(CANCELLATION_DATE_KEY)
    }

    pub fn last_run(&self) -> Result<Option<LastRun>> {
        Ok(self.read_json(LAST_RUN_KEY)?)
    }

    pub fn set_last_run(&self, last_run: &LastRun) -> Result<()> {
        let value = serde_json::to_string(last_run).context("Failed to serialize last run")?;
        self.store.set_state(LAST_RUN_KEY, &value)
    }

    pub fn clear_last_run(&self) -> Result<()> {
        self.store.delete_state(LAST_RUN_KEY)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self.store.get_state(key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring corrupt value for setting {}: {}", key, e);
                Ok(None)
            }
        }
    }
}
