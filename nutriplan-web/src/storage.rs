//! `localStorage` backend for planner snapshots.

use nutriplan_core::{PlannerError, PlannerSnapshot, PlannerStorage};

use crate::dom;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] PlannerError),
}

/// Snapshot slot in the browser's `localStorage`.
///
/// Last writer wins: two tabs on the same origin overwrite each other's blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStorageBackend {
    key: String,
}

impl LocalStorageBackend {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn storage() -> Result<web_sys::Storage, WebStorageError> {
    dom::local_storage().map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))
}

impl PlannerStorage for LocalStorageBackend {
    type Error = WebStorageError;

    fn save_snapshot(&self, snapshot: &PlannerSnapshot) -> Result<(), Self::Error> {
        let json = snapshot.to_json()?;
        storage()?
            .set_item(&self.key, &json)
            .map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))
    }

    fn load_snapshot(&self) -> Result<Option<PlannerSnapshot>, Self::Error> {
        let raw = storage()?
            .get_item(&self.key)
            .map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))?;
        match raw {
            Some(json) => Ok(Some(PlannerSnapshot::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn clear_snapshot(&self) -> Result<(), Self::Error> {
        storage()?
            .remove_item(&self.key)
            .map_err(|err| WebStorageError::Storage(dom::js_error_message(&err)))
    }
}
