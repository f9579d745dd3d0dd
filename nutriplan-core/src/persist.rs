//! Persisted snapshots, the storage collaborator, and the write-through engine.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

use crate::catalog::MenuCatalog;
use crate::constants::{LOG_TARGET_PERSIST, SNAPSHOT_VERSION};
use crate::error::PlannerError;
use crate::planner::{
    CommitOutcome, Direction, PlannerEvent, PlannerOutcome, PlannerSession, UndoOutcome,
};
use crate::pool::MenuPool;
use crate::share::share_url;
use crate::state::SelectionState;
use crate::summary::summary_text;
use crate::view::PlannerView;

const fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

/// The persisted blob: selection state plus the shuffled pool it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSnapshot {
    #[serde(default = "snapshot_version")]
    pub version: u32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub state: SelectionState,
    /// Absent when the blob predates pool persistence; the pool is then reseeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<MenuPool>,
}

impl PlannerSnapshot {
    #[must_use]
    pub fn capture(session: &PlannerSession) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            seed: session.seed(),
            state: session.state().clone(),
            pool: Some(session.pool().clone()),
        }
    }

    /// # Errors
    ///
    /// Returns [`PlannerError::Persistence`] if the snapshot cannot be serialized.
    pub fn to_json(&self) -> Result<String, PlannerError> {
        serde_json::to_string(self).map_err(|err| PlannerError::Persistence(err.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`PlannerError::Persistence`] if the blob is malformed or was
    /// written by a newer format version.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|err| PlannerError::Persistence(err.to_string()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(PlannerError::Persistence(format!(
                "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Rebuild the session. A missing pool is reseeded from the stored seed.
    #[must_use]
    pub fn into_session(self, catalog: &MenuCatalog) -> PlannerSession {
        match self.pool {
            Some(pool) => PlannerSession::from_parts(self.state, pool, self.seed),
            None => PlannerSession::reseeded(self.state, catalog, self.seed),
        }
    }
}

/// Collaborator that keeps one snapshot durable between page loads.
/// Platform-specific implementations should provide this.
pub trait PlannerStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, snapshot: &PlannerSnapshot) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if a stored snapshot exists but cannot be read.
    fn load_snapshot(&self) -> Result<Option<PlannerSnapshot>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the stored snapshot cannot be removed.
    fn clear_snapshot(&self) -> Result<(), Self::Error>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStorageError {
    #[error("storage rejected the write")]
    WriteRejected,
    #[error("stored snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// In-memory storage holding the serialized blob. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Rc<RefCell<Option<String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, as a full quota would.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    pub fn set_raw(&self, json: impl Into<String>) {
        *self.blob.borrow_mut() = Some(json.into());
    }
}

impl PlannerStorage for MemoryStorage {
    type Error = MemoryStorageError;

    fn save_snapshot(&self, snapshot: &PlannerSnapshot) -> Result<(), Self::Error> {
        if self.reject_writes.get() {
            return Err(MemoryStorageError::WriteRejected);
        }
        let json = snapshot
            .to_json()
            .map_err(|err| MemoryStorageError::Corrupt(err.to_string()))?;
        *self.blob.borrow_mut() = Some(json);
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<PlannerSnapshot>, Self::Error> {
        self.blob
            .borrow()
            .as_deref()
            .map(PlannerSnapshot::from_json)
            .transpose()
            .map_err(|err| MemoryStorageError::Corrupt(err.to_string()))
    }

    fn clear_snapshot(&self) -> Result<(), Self::Error> {
        self.blob.borrow_mut().take();
        Ok(())
    }
}

/// Result of the write that follows a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum Persistence {
    Saved,
    /// The session continues in memory; a reload may lose the latest action.
    Failed(String),
}

impl Persistence {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Operation result paired with the outcome of persisting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineResponse<T> {
    pub value: T,
    pub persistence: Persistence,
}

/// How [`PlannerEngine::resume`] obtained its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionOrigin {
    Fresh,
    Restored,
    /// The stored blob was unreadable and has been replaced.
    Replaced,
}

/// Planner session with write-through persistence after every mutation.
pub struct PlannerEngine<S: PlannerStorage> {
    session: PlannerSession,
    catalog: MenuCatalog,
    storage: S,
    origin: SessionOrigin,
}

impl<S: PlannerStorage> PlannerEngine<S> {
    /// Start a fresh session. Whatever is stored stays until the first
    /// mutation writes over it.
    pub fn new(storage: S, catalog: MenuCatalog, seed: u64) -> Self {
        let session = PlannerSession::new(&catalog, seed);
        Self {
            session,
            catalog,
            storage,
            origin: SessionOrigin::Fresh,
        }
    }

    /// Restore the stored session, or start fresh from `fresh_seed`.
    ///
    /// A corrupt blob is logged and overwritten with the fresh session.
    pub fn resume(storage: S, catalog: MenuCatalog, fresh_seed: u64) -> Self {
        let (session, origin) = match storage.load_snapshot() {
            Ok(Some(snapshot)) => {
                log::info!(
                    target: LOG_TARGET_PERSIST,
                    "restoring snapshot v{} (seed {})",
                    snapshot.version,
                    snapshot.seed
                );
                (snapshot.into_session(&catalog), SessionOrigin::Restored)
            }
            Ok(None) => (PlannerSession::new(&catalog, fresh_seed), SessionOrigin::Fresh),
            Err(err) => {
                log::warn!(
                    target: LOG_TARGET_PERSIST,
                    "discarding unreadable snapshot: {err}"
                );
                (PlannerSession::new(&catalog, fresh_seed), SessionOrigin::Replaced)
            }
        };
        let engine = Self {
            session,
            catalog,
            storage,
            origin,
        };
        if origin == SessionOrigin::Replaced {
            engine.persist();
        }
        engine
    }

    #[must_use]
    pub const fn session(&self) -> &PlannerSession {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn origin(&self) -> SessionOrigin {
        self.origin
    }

    #[must_use]
    pub fn view(&self) -> PlannerView {
        self.session.view()
    }

    #[must_use]
    pub fn summary_text(&self) -> String {
        summary_text(self.session.state())
    }

    /// Share link for the current plan, its fragment starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Propagates share-token encoding failures.
    pub fn share_url(&self, base_url: &str, prefix: &str) -> Result<String, PlannerError> {
        share_url(base_url, prefix, self.session.state())
    }

    /// # Errors
    ///
    /// See [`PlannerSession::navigate`].
    pub fn navigate(
        &mut self,
        direction: Direction,
    ) -> Result<EngineResponse<usize>, PlannerError> {
        let index = self.session.navigate(direction)?;
        Ok(self.respond(index))
    }

    /// # Errors
    ///
    /// See [`PlannerSession::jump_to`].
    pub fn jump_to(&mut self, index: usize) -> Result<EngineResponse<usize>, PlannerError> {
        let index = self.session.jump_to(index)?;
        Ok(self.respond(index))
    }

    /// # Errors
    ///
    /// See [`PlannerSession::select_days`].
    pub fn select_days(&mut self, count: u8) -> Result<EngineResponse<()>, PlannerError> {
        self.session.select_days(count)?;
        Ok(self.respond(()))
    }

    pub fn clear_pending_days(&mut self) -> EngineResponse<bool> {
        let cleared = self.session.clear_pending_days();
        self.respond(cleared)
    }

    /// # Errors
    ///
    /// See [`PlannerSession::commit`].
    pub fn commit(&mut self) -> Result<EngineResponse<CommitOutcome>, PlannerError> {
        let outcome = self.session.commit()?;
        Ok(self.respond(outcome))
    }

    pub fn undo(&mut self) -> EngineResponse<UndoOutcome> {
        let outcome = self.session.undo();
        self.respond(outcome)
    }

    /// Clear storage, then start over with a fresh shuffle.
    pub fn restart(&mut self, seed: u64) -> EngineResponse<()> {
        if let Err(err) = self.storage.clear_snapshot() {
            log::warn!(target: LOG_TARGET_PERSIST, "failed to clear snapshot: {err}");
        }
        self.session.reset(&self.catalog, seed);
        self.origin = SessionOrigin::Fresh;
        self.respond(())
    }

    /// Dispatch a rendering-layer event and persist the result.
    ///
    /// # Errors
    ///
    /// Propagates the error of the operation the event maps to.
    pub fn apply(
        &mut self,
        event: PlannerEvent,
    ) -> Result<EngineResponse<PlannerOutcome>, PlannerError> {
        if let PlannerEvent::Restart(seed) = event {
            return Ok(self.restart(seed).map(|()| PlannerOutcome::Restarted));
        }
        let outcome = self.session.apply(event, &self.catalog)?;
        Ok(self.respond(outcome))
    }

    /// Write the current session through to storage.
    pub fn persist(&self) -> Persistence {
        let snapshot = PlannerSnapshot::capture(&self.session);
        match self.storage.save_snapshot(&snapshot) {
            Ok(()) => Persistence::Saved,
            Err(err) => {
                log::warn!(target: LOG_TARGET_PERSIST, "failed to save snapshot: {err}");
                Persistence::Failed(err.to_string())
            }
        }
    }

    fn respond<T>(&self, value: T) -> EngineResponse<T> {
        EngineResponse {
            value,
            persistence: self.persist(),
        }
    }

    /// Consume the engine, returning the session and storage.
    pub fn into_parts(self) -> (PlannerSession, S) {
        (self.session, self.storage)
    }
}

impl<T> EngineResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EngineResponse<U> {
        EngineResponse {
            value: f(self.value),
            persistence: self.persistence,
        }
    }
}
