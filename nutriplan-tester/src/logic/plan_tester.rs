use anyhow::Result;
use nutriplan_core::constants::SHARE_FRAGMENT_PREFIX;
use nutriplan_core::{
    Category, MemoryStorage, MenuCatalog, PlannerEngine, PlannerEvent, PlannerOutcome,
    PlannerPhase, PlannerSession, PlannerStorage, SelectionState, SessionOrigin, SourceBucket,
    UndoOutcome, decode_share_token, summary_text, token_from_fragment,
};
use std::path::PathBuf;
use std::sync::Arc;

use super::assets::{FileStorage, TesterAssets};
use super::invariants::check_session;
use super::policy::PlanningStrategy;

pub const DEFAULT_MAX_STEPS: usize = 200;
const SHARE_BASE_URL: &str = "https://nutriplan.test/planner/";

pub type Expectation = fn(&RunSummary) -> Result<()>;

/// Where a run writes its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    /// A JSON file in the system temp directory, removed afterwards.
    File,
}

/// What a scenario does with one seed.
#[derive(Clone)]
pub struct SessionPlan {
    pub strategy: PlanningStrategy,
    pub max_steps: usize,
    pub stop_when_done: bool,
    /// Resume a second engine from storage after every step and compare.
    pub reload_every_step: bool,
    /// Undo everything at the end and compare against a fresh session.
    pub unwind_at_end: bool,
    pub check_share: bool,
    pub storage: StorageKind,
    pub drop_buckets: Vec<SourceBucket>,
    pub expectations: Vec<Expectation>,
}

impl std::fmt::Debug for SessionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPlan")
            .field("strategy", &self.strategy)
            .field("max_steps", &self.max_steps)
            .field("reload_every_step", &self.reload_every_step)
            .field("unwind_at_end", &self.unwind_at_end)
            .field("check_share", &self.check_share)
            .field("storage", &self.storage)
            .field("drop_buckets", &self.drop_buckets)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

impl SessionPlan {
    pub fn new(strategy: PlanningStrategy) -> Self {
        Self {
            strategy,
            max_steps: DEFAULT_MAX_STEPS,
            stop_when_done: true,
            reload_every_step: false,
            unwind_at_end: false,
            check_share: false,
            storage: StorageKind::Memory,
            drop_buckets: Vec::new(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    #[must_use]
    pub const fn keep_going(mut self) -> Self {
        self.stop_when_done = false;
        self
    }

    #[must_use]
    pub const fn with_reloads(mut self) -> Self {
        self.reload_every_step = true;
        self
    }

    #[must_use]
    pub const fn with_unwind(mut self) -> Self {
        self.unwind_at_end = true;
        self
    }

    #[must_use]
    pub const fn with_share_check(mut self) -> Self {
        self.check_share = true;
        self
    }

    #[must_use]
    pub const fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn without_bucket(mut self, bucket: SourceBucket) -> Self {
        self.drop_buckets.push(bucket);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    fn prepare_catalog(&self, catalog: &MenuCatalog) -> MenuCatalog {
        self.drop_buckets
            .iter()
            .fold(catalog.clone(), |catalog, bucket| catalog.without_bucket(*bucket))
    }
}

/// One step of a run, kept for failure context.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: usize,
    pub event: PlannerEvent,
    pub rationale: &'static str,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub strategy: PlanningStrategy,
    pub steps: Vec<StepRecord>,
    pub commits: usize,
    pub undos: usize,
    pub rejected: usize,
    pub restarts: usize,
    pub violations: Vec<String>,
    pub phase: PlannerPhase,
    pub final_state: SelectionState,
    pub summary_text: String,
}

impl RunSummary {
    fn new(seed: u64, strategy: PlanningStrategy) -> Self {
        Self {
            seed,
            strategy,
            steps: Vec::new(),
            commits: 0,
            undos: 0,
            rejected: 0,
            restarts: 0,
            violations: Vec::new(),
            phase: PlannerPhase::Selecting {
                category: Category::Breakfast,
            },
            final_state: SelectionState::default(),
            summary_text: String::new(),
        }
    }

    fn record(&mut self, outcome: &PlannerOutcome) {
        match outcome {
            PlannerOutcome::Committed(_) => self.commits += 1,
            PlannerOutcome::Undone(UndoOutcome::Reverted(_)) => self.undos += 1,
            PlannerOutcome::Restarted => self.restarts += 1,
            _ => {}
        }
    }

    /// The last few steps, newest first.
    pub fn recent_steps(&self, count: usize) -> String {
        if self.steps.is_empty() {
            return "no steps recorded".to_string();
        }
        self.steps
            .iter()
            .rev()
            .take(count)
            .map(|step| {
                format!(
                    "#{} {:?} ({}){}",
                    step.step,
                    step.event,
                    step.rationale,
                    if step.accepted { "" } else { " rejected" }
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Runs [`SessionPlan`]s against the shared catalog.
#[derive(Debug, Clone)]
pub struct PlanTester {
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl PlanTester {
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn assets(&self) -> &TesterAssets {
        &self.assets
    }

    pub fn run_plan(&self, plan: &SessionPlan, seed: u64) -> Result<RunSummary> {
        let catalog = plan.prepare_catalog(self.assets.catalog());
        match plan.storage {
            StorageKind::Memory => Ok(self.drive(plan, seed, &catalog, MemoryStorage::new())),
            StorageKind::File => {
                let path = temp_storage_path(seed);
                let storage = FileStorage::new(&path);
                let summary = self.drive(plan, seed, &catalog, storage.clone());
                storage.clear_snapshot()?;
                Ok(summary)
            }
        }
    }

    fn drive<S>(
        &self,
        plan: &SessionPlan,
        seed: u64,
        catalog: &MenuCatalog,
        storage: S,
    ) -> RunSummary
    where
        S: PlannerStorage + Clone,
    {
        let mut engine = PlannerEngine::new(storage.clone(), catalog.clone(), seed);
        let mut policy = plan.strategy.create_policy(seed);
        let mut summary = RunSummary::new(seed, plan.strategy);

        if let Err(err) = check_session(engine.session(), catalog) {
            summary.violations.push(format!("fresh session: {err}"));
        }

        for step in 0..plan.max_steps {
            let view = engine.view();
            if plan.stop_when_done && view.phase.is_terminal() {
                break;
            }
            let decision = policy.next_event(&view);
            let before = engine.session().clone();
            let accepted = match engine.apply(decision.event) {
                Ok(response) => {
                    summary.record(&response.value);
                    if let Some(message) = persistence_failure(&response.persistence) {
                        summary.violations.push(format!("step {step}: {message}"));
                    }
                    true
                }
                Err(err) => {
                    summary.rejected += 1;
                    if engine.session() != &before {
                        summary
                            .violations
                            .push(format!("step {step}: rejected event changed state ({err})"));
                    }
                    false
                }
            };
            if self.verbose {
                log::debug!(
                    "seed {seed} step {step}: {:?} -> {}",
                    decision.event,
                    if accepted { "ok" } else { "rejected" }
                );
            }
            summary.steps.push(StepRecord {
                step,
                event: decision.event,
                rationale: decision.rationale,
                accepted,
            });

            if let Err(err) = check_session(engine.session(), catalog) {
                summary.violations.push(format!("step {step}: {err}"));
                break;
            }
            if plan.reload_every_step && accepted {
                let resumed = PlannerEngine::resume(storage.clone(), catalog.clone(), !seed);
                if resumed.origin() != SessionOrigin::Restored
                    || resumed.session() != engine.session()
                {
                    summary
                        .violations
                        .push(format!("step {step}: reloaded session differs"));
                }
            }
        }

        if plan.check_share {
            if let Err(err) = check_share(&engine) {
                summary.violations.push(format!("share link: {err}"));
            }
        }
        summary.phase = engine.view().phase;
        summary.final_state = engine.session().state().clone();
        summary.summary_text = engine.summary_text();

        if plan.unwind_at_end {
            if let Err(err) = unwind(&mut engine, catalog) {
                summary.violations.push(format!("unwind: {err}"));
            }
        }
        summary
    }
}

fn persistence_failure(persistence: &nutriplan_core::Persistence) -> Option<String> {
    match persistence {
        nutriplan_core::Persistence::Saved => None,
        nutriplan_core::Persistence::Failed(reason) => Some(format!("save failed: {reason}")),
    }
}

fn check_share<S: PlannerStorage>(engine: &PlannerEngine<S>) -> Result<()> {
    let url = engine.share_url(SHARE_BASE_URL, SHARE_FRAGMENT_PREFIX)?;
    let fragment = url
        .strip_prefix(SHARE_BASE_URL)
        .ok_or_else(|| anyhow::anyhow!("share url {url} lost its base"))?;
    let token = token_from_fragment(fragment, SHARE_FRAGMENT_PREFIX)
        .ok_or_else(|| anyhow::anyhow!("share url {url} has no token"))?;
    let shared = decode_share_token(token)?;
    anyhow::ensure!(
        summary_text(&shared) == engine.summary_text(),
        "shared summary differs from the planner's"
    );
    anyhow::ensure!(
        shared.undo_history.is_empty() && shared.pending_days.is_none(),
        "shared state carries session-only fields"
    );
    Ok(())
}

fn unwind<S: PlannerStorage>(engine: &mut PlannerEngine<S>, catalog: &MenuCatalog) -> Result<()> {
    let mut guard = 0;
    while engine.undo().value != UndoOutcome::NothingToUndo {
        guard += 1;
        anyhow::ensure!(guard <= 1_000, "undo never ran dry");
    }
    let session = engine.session();
    let fresh = PlannerSession::new(catalog, session.seed());
    anyhow::ensure!(
        session.pool() == fresh.pool(),
        "pool order not restored after undoing everything"
    );
    let state = session.state();
    anyhow::ensure!(
        state.committed == fresh.state().committed
            && state.completed_days == fresh.state().completed_days
            && state.current_category_index == fresh.state().current_category_index,
        "state not pristine after undoing everything"
    );
    anyhow::ensure!(!session.can_undo(), "undo still available");
    Ok(())
}

fn temp_storage_path(seed: u64) -> PathBuf {
    std::env::temp_dir().join(format!(
        "nutriplan-tester-{seed}-{}.json",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}
