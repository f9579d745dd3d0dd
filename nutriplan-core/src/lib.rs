//! Nutri Planner Engine
//!
//! Platform-agnostic core of the weekly meal planner: menu ingestion, the
//! shuffled menu pool, the undoable selection state machine, summaries, share
//! tokens and persistence traits. No UI or platform-specific dependencies.

pub mod catalog;
pub mod category;
pub mod config;
pub mod constants;
pub mod error;
pub mod menu;
pub mod persist;
pub mod planner;
pub mod pool;
pub mod share;
pub mod state;
pub mod summary;
pub mod undo;
pub mod view;

// Re-export commonly used types
pub use catalog::{
    CatalogManifest, CatalogSource, IngestionReport, MenuCatalog, StaticCatalogSource,
    StaticSourceError,
};
pub use category::{Category, SourceBucket};
pub use config::PlannerConfig;
pub use error::{ConfigError, IngestionError, InvalidSelection, PlannerError};
pub use menu::{CommittedSelection, Dish, Ingredient, Measure, MenuEntry};
pub use persist::{
    EngineResponse, MemoryStorage, MemoryStorageError, Persistence, PlannerEngine,
    PlannerSnapshot, PlannerStorage, SessionOrigin,
};
pub use planner::{
    CommitOutcome, Direction, PlannerEvent, PlannerOutcome, PlannerSession, UndoOutcome,
};
pub use pool::MenuPool;
pub use share::{
    decode_share_token, encode_share_token, share_fragment, share_url, token_from_fragment,
};
pub use state::{RepairReport, SelectionState};
pub use summary::{PlanSummary, SummarySection, summary_text};
pub use undo::{UndoLog, UndoRecord};
pub use view::{PlannerPhase, PlannerView};
