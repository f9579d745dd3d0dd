//! Centralized constants for the planner engine.
//!
//! The weekly quota and the persistence/share identifiers live here so the
//! controller, the web collaborators, and the tester agree on one value.

// Planning quota -----------------------------------------------------------
/// Days every category has to cover before the plan is complete.
pub const DAYS_PER_CATEGORY: u8 = 7;
/// Smallest day count a single commit may assign.
pub const MIN_DAYS_PER_COMMIT: u8 = 1;

// Persistence --------------------------------------------------------------
/// Default key for the persisted planner snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "nutriplan.selection";
/// Version tag written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

// Share links --------------------------------------------------------------
/// URL fragment prefix that marks a shared read-only summary.
pub const SHARE_FRAGMENT_PREFIX: &str = "#share=";

// Catalog ingestion --------------------------------------------------------
/// Directory manifest listing every menu document to ingest.
pub const CATALOG_MANIFEST_NAME: &str = "json_directory.json";
/// Document key that carries metadata rather than menus.
pub(crate) const CATALOG_ID_KEY: &str = "id";
/// Raw category keys starting with this prefix collapse into the snack bucket.
pub(crate) const SNACK_KEY_PREFIX: &str = "snack";

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_PLANNER: &str = "nutriplan::planner";
pub(crate) const LOG_TARGET_CATALOG: &str = "nutriplan::catalog";
pub(crate) const LOG_TARGET_PERSIST: &str = "nutriplan::persist";
