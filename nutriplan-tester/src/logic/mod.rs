pub mod assets;
pub mod invariants;
pub mod plan_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use assets::{FileCatalogSource, FileStorage, TesterAssets};
pub use plan_tester::{PlanTester, RunSummary, SessionPlan, StorageKind};
pub use policy::PlanningStrategy;
pub use seeds::resolve_seeds;
pub use tester::*;
