//! Progression controller.
//!
//! [`PlannerSession`] is the explicit session object: it owns the selection
//! state and the shuffled pool, and is the only writer to either. Every
//! operation starts by restoring invariants through [`PlannerSession::normalize`],
//! so callers never have to bounds-check indices themselves.

use serde::{Deserialize, Serialize};

use crate::catalog::MenuCatalog;
use crate::category::Category;
use crate::constants::{LOG_TARGET_PLANNER, MIN_DAYS_PER_COMMIT};
use crate::error::{InvalidSelection, PlannerError};
use crate::menu::CommittedSelection;
use crate::pool::MenuPool;
use crate::state::{RepairReport, SelectionState};
use crate::undo::UndoRecord;
use crate::view::{PlannerPhase, PlannerView};

/// Direction of a carousel step over the active pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Previous,
    Next,
}

/// Events pushed by the rendering layer into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PlannerEvent {
    NavigatePrev,
    NavigateNext,
    JumpTo(usize),
    ChooseDays(u8),
    ClearDays,
    Commit,
    Undo,
    /// Start over with a freshly shuffled pool drawn from this seed.
    Restart(u64),
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub category: Category,
    pub selection: CommittedSelection,
    /// The commit filled the category's weekly quota.
    pub category_completed: bool,
    /// Phase after any category advance.
    pub phase: PlannerPhase,
}

/// What an undo request did, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "camelCase")]
pub enum UndoOutcome {
    /// A pending day count was dropped; nothing committed was touched.
    ClearedPending,
    /// The most recent commit was reverted.
    Reverted(UndoRecord),
    NothingToUndo,
}

/// Outcome of dispatching one [`PlannerEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum PlannerOutcome {
    Navigated(usize),
    DaysChosen(u8),
    DaysCleared(bool),
    Committed(CommitOutcome),
    Undone(UndoOutcome),
    Restarted,
}

/// One planning session: selection state plus its shuffled menu pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSession {
    state: SelectionState,
    pool: MenuPool,
    seed: u64,
}

impl PlannerSession {
    /// Fresh session with a pool shuffled from `seed`.
    #[must_use]
    pub fn new(catalog: &MenuCatalog, seed: u64) -> Self {
        log::debug!(target: LOG_TARGET_PLANNER, "new session with seed {seed}");
        Self::from_parts(SelectionState::default(), MenuPool::seeded(catalog, seed), seed)
    }

    /// Session from previously stored parts. Invariants are restored before use.
    #[must_use]
    pub fn from_parts(state: SelectionState, pool: MenuPool, seed: u64) -> Self {
        let mut session = Self { state, pool, seed };
        session.normalize();
        session
    }

    /// Resume a state whose shuffled pool was not kept.
    ///
    /// The pool is reseeded from `seed` and every committed menu is withdrawn
    /// from it, so nothing already planned is offered again. The undo history
    /// cannot be replayed against a different shuffle and is dropped.
    #[must_use]
    pub fn reseeded(mut state: SelectionState, catalog: &MenuCatalog, seed: u64) -> Self {
        let mut pool = MenuPool::seeded(catalog, seed);
        for category in Category::ORDER {
            for selection in state.committed_for(category) {
                if pool.withdraw(category, &selection.menu_name).is_none() {
                    log::debug!(
                        target: LOG_TARGET_PLANNER,
                        "{category}: committed menu {} is not in the catalog",
                        selection.menu_name
                    );
                }
            }
        }
        if !state.undo_history.is_empty() {
            log::warn!(
                target: LOG_TARGET_PLANNER,
                "pool reseeded; discarding {} undo records",
                state.undo_history.len()
            );
            state.undo_history.clear();
        }
        Self::from_parts(state, pool, seed)
    }

    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub const fn pool(&self) -> &MenuPool {
        &self.pool
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Consume the session, returning its state, pool, and seed.
    #[must_use]
    pub fn into_parts(self) -> (SelectionState, MenuPool, u64) {
        (self.state, self.pool, self.seed)
    }

    /// Restore every invariant: state repair, category skipping, and the
    /// menu-index clamp. Idempotent.
    pub fn normalize(&mut self) -> RepairReport {
        let report = self.state.repair();
        self.skip_unplannable();
        self.clamp_menu_index();
        report
    }

    /// Move the cursor one step around the active pool, wrapping at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSelection::PlanComplete`] when no category is active.
    pub fn navigate(&mut self, direction: Direction) -> Result<usize, PlannerError> {
        self.normalize();
        let category = self.active_category()?;
        let len = self.pool.len(category);
        if len == 0 {
            return Err(InvalidSelection::EmptyPool(category).into());
        }
        let index = self.state.current_menu_index;
        let next = match direction {
            Direction::Next => (index + 1) % len,
            Direction::Previous => (index + len - 1) % len,
        };
        self.state.current_menu_index = next;
        self.state.pending_days = None;
        log::debug!(target: LOG_TARGET_PLANNER, "{category}: menu {index} -> {next}");
        Ok(next)
    }

    /// Put the cursor on `index` directly, as a dropdown pick does.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfRange`] if `index` is not in the active pool,
    /// or [`InvalidSelection::PlanComplete`] when no category is active.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, PlannerError> {
        self.normalize();
        let category = self.active_category()?;
        let len = self.pool.len(category);
        if index >= len {
            return Err(PlannerError::OutOfRange {
                category,
                index,
                len,
            });
        }
        self.state.current_menu_index = index;
        self.state.pending_days = None;
        Ok(index)
    }

    /// Record a tentative day count for the menu under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSelection::DaysOutOfRange`] unless
    /// `1 <= count <= remaining_days`. State is unchanged on error.
    pub fn select_days(&mut self, count: u8) -> Result<(), PlannerError> {
        self.normalize();
        let category = self.active_category()?;
        if self.pool.is_empty(category) {
            return Err(InvalidSelection::EmptyPool(category).into());
        }
        let remaining = self.state.remaining_days(category);
        if count < MIN_DAYS_PER_COMMIT || count > remaining {
            return Err(InvalidSelection::DaysOutOfRange {
                requested: count,
                remaining,
            }
            .into());
        }
        self.state.pending_days = Some(count);
        Ok(())
    }

    /// Drop the pending day count. Returns whether one was set.
    pub fn clear_pending_days(&mut self) -> bool {
        self.normalize();
        self.state.pending_days.take().is_some()
    }

    /// Assign the pending days to the menu under the cursor.
    ///
    /// The menu leaves the pool and an undo record is pushed. The controller
    /// advances once the category's quota is met or its pool runs dry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSelection::NoPendingDays`] without a pending count,
    /// [`InvalidSelection::EmptyPool`] if there is no menu to commit, or
    /// [`InvalidSelection::PlanComplete`] when no category is active.
    pub fn commit(&mut self) -> Result<CommitOutcome, PlannerError> {
        self.normalize();
        let category = self.active_category()?;
        let days = self
            .state
            .pending_days
            .ok_or(InvalidSelection::NoPendingDays)?;
        let index = self.state.current_menu_index;
        if self.pool.get(category, index).is_none() {
            return Err(InvalidSelection::EmptyPool(category).into());
        }

        let menu = self.pool.remove_at(category, index)?;
        let selection = CommittedSelection::from_entry(&menu, days);
        self.state.undo_history.push(UndoRecord {
            category,
            menu,
            menu_index: index,
            days_used: days,
            previous_category_index: self.state.current_category_index,
            previous_menu_index: index,
        });
        self.state.record_commit(category, selection.clone());
        self.state.pending_days = None;
        self.clamp_menu_index();
        log::debug!(
            target: LOG_TARGET_PLANNER,
            "{category}: committed {} for {days} days",
            selection.menu_name
        );

        let category_completed = self.state.remaining_days(category) == 0;
        if category_completed {
            log::info!(target: LOG_TARGET_PLANNER, "{category} complete");
        }
        self.skip_unplannable();
        Ok(CommitOutcome {
            category,
            selection,
            category_completed,
            phase: self.phase(),
        })
    }

    /// Undo in priority order: pending days first, then the latest commit.
    pub fn undo(&mut self) -> UndoOutcome {
        self.normalize();
        if self.state.pending_days.take().is_some() {
            return UndoOutcome::ClearedPending;
        }
        let Some(record) = self.state.undo_history.pop() else {
            return UndoOutcome::NothingToUndo;
        };

        self.pool
            .insert_at(record.category, record.menu_index, record.menu.clone());
        self.state.revert_commit(record.category, record.days_used);
        self.state.current_category_index = record.previous_category_index;
        self.state.current_menu_index = record.previous_menu_index;
        self.state.pending_days = None;
        self.clamp_menu_index();
        log::debug!(
            target: LOG_TARGET_PLANNER,
            "{}: reverted {}",
            record.category,
            record.menu.menu_name
        );
        UndoOutcome::Reverted(record)
    }

    /// Discard all progress and reshuffle from `seed`.
    pub fn reset(&mut self, catalog: &MenuCatalog, seed: u64) {
        log::info!(target: LOG_TARGET_PLANNER, "restarting session with seed {seed}");
        *self = Self::new(catalog, seed);
    }

    /// Dispatch one rendering-layer event.
    ///
    /// # Errors
    ///
    /// Propagates the error of the operation the event maps to.
    pub fn apply(
        &mut self,
        event: PlannerEvent,
        catalog: &MenuCatalog,
    ) -> Result<PlannerOutcome, PlannerError> {
        match event {
            PlannerEvent::NavigatePrev => self
                .navigate(Direction::Previous)
                .map(PlannerOutcome::Navigated),
            PlannerEvent::NavigateNext => {
                self.navigate(Direction::Next).map(PlannerOutcome::Navigated)
            }
            PlannerEvent::JumpTo(index) => self.jump_to(index).map(PlannerOutcome::Navigated),
            PlannerEvent::ChooseDays(count) => self
                .select_days(count)
                .map(|()| PlannerOutcome::DaysChosen(count)),
            PlannerEvent::ClearDays => Ok(PlannerOutcome::DaysCleared(self.clear_pending_days())),
            PlannerEvent::Commit => self.commit().map(PlannerOutcome::Committed),
            PlannerEvent::Undo => Ok(PlannerOutcome::Undone(self.undo())),
            PlannerEvent::Restart(seed) => {
                self.reset(catalog, seed);
                Ok(PlannerOutcome::Restarted)
            }
        }
    }

    /// Current phase, derived from state on every call.
    #[must_use]
    pub fn phase(&self) -> PlannerPhase {
        if self.state.is_complete() {
            return PlannerPhase::AllComplete;
        }
        match self.state.current_category() {
            Some(category) => PlannerPhase::Selecting { category },
            None => PlannerPhase::Exhausted {
                incomplete: self.state.incomplete_categories(),
            },
        }
    }

    /// Whether an undo request would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.state.pending_days.is_some() || !self.state.undo_history.is_empty()
    }

    /// View-model for the rendering layer.
    #[must_use]
    pub fn view(&self) -> PlannerView {
        let category = self.state.current_category();
        let (used_days, remaining_days, pool) = category.map_or((0, 0, Vec::new()), |category| {
            (
                self.state.used_days(category),
                self.state.remaining_days(category),
                self.pool.entries(category).to_vec(),
            )
        });
        let completes_plan = match (category, self.state.pending_days) {
            (Some(active), Some(pending)) => {
                pending == remaining_days
                    && Category::ORDER.into_iter().all(|other| {
                        other == active || self.state.remaining_days(other) == 0
                    })
            }
            _ => false,
        };
        PlannerView {
            category,
            used_days,
            remaining_days,
            pool,
            current_index: self.state.current_menu_index,
            pending_days: self.state.pending_days,
            can_undo: self.can_undo(),
            phase: self.phase(),
            is_last_category: category.is_some_and(Category::is_last),
            completes_plan,
        }
    }

    fn active_category(&self) -> Result<Category, PlannerError> {
        self.state
            .current_category()
            .ok_or_else(|| InvalidSelection::PlanComplete.into())
    }

    /// Move past categories whose quota is met or whose pool ran dry.
    /// Terminates because the index only grows toward the end of the order.
    fn skip_unplannable(&mut self) {
        while let Some(category) = self.state.current_category() {
            let remaining = self.state.remaining_days(category);
            if remaining > 0 && !self.pool.is_empty(category) {
                break;
            }
            if remaining > 0 {
                log::warn!(
                    target: LOG_TARGET_PLANNER,
                    "{category}: no menus left with {remaining} days unplanned, skipping"
                );
            }
            self.state.current_category_index += 1;
            self.state.current_menu_index = 0;
            self.state.pending_days = None;
        }
    }

    fn clamp_menu_index(&mut self) {
        let len = self
            .state
            .current_category()
            .map_or(0, |category| self.pool.len(category));
        if self.state.current_menu_index >= len {
            self.state.current_menu_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::SourceBucket;
    use crate::menu::{Dish, MenuEntry};

    fn entry(name: &str) -> MenuEntry {
        MenuEntry::new(
            name,
            vec![Dish {
                name: format!("{name} dish"),
                ingredients: Vec::new(),
            }],
        )
    }

    fn entries(names: &[&str]) -> Vec<MenuEntry> {
        names.iter().map(|name| entry(name)).collect()
    }

    fn pool_names(session: &PlannerSession, category: Category) -> Vec<String> {
        session
            .pool()
            .entries(category)
            .iter()
            .map(|menu| menu.menu_name.clone())
            .collect()
    }

    fn full_pool() -> MenuPool {
        MenuPool::from_ordered(
            Category::ORDER
                .into_iter()
                .map(|category| (category, entries(&["A", "B", "C"]))),
        )
    }

    fn session() -> PlannerSession {
        PlannerSession::from_parts(SelectionState::default(), full_pool(), 1)
    }

    #[test]
    fn commit_then_undo_restores_pool_and_cursor() {
        let mut session = session();
        assert_eq!(session.navigate(Direction::Next).unwrap(), 1);
        session.select_days(3).unwrap();
        let outcome = session.commit().unwrap();

        assert_eq!(outcome.selection.menu_name, "B");
        assert!(!outcome.category_completed);
        assert_eq!(session.state().used_days(Category::Breakfast), 3);
        assert_eq!(pool_names(&session, Category::Breakfast), vec!["A", "C"]);
        assert_eq!(session.state().current_menu_index, 1);

        assert!(matches!(session.undo(), UndoOutcome::Reverted(_)));
        assert_eq!(session.state().used_days(Category::Breakfast), 0);
        assert!(session.state().committed_for(Category::Breakfast).is_empty());
        assert_eq!(pool_names(&session, Category::Breakfast), vec!["A", "B", "C"]);
        assert_eq!(session.state().current_menu_index, 1);

        let mut expected = self::session();
        expected.navigate(Direction::Next).unwrap();
        assert_eq!(session, expected);
    }

    #[test]
    fn commit_at_pool_end_reclamps_cursor_to_zero() {
        let mut session = session();
        session.jump_to(2).unwrap();
        session.select_days(1).unwrap();
        session.commit().unwrap();
        assert_eq!(session.state().current_menu_index, 0);
        assert_eq!(session.view().current_menu().unwrap().menu_name, "A");
    }

    #[test]
    fn navigation_wraps_and_clears_pending_days() {
        let mut session = session();
        assert_eq!(session.navigate(Direction::Previous).unwrap(), 2);
        assert_eq!(session.navigate(Direction::Next).unwrap(), 0);

        session.select_days(2).unwrap();
        session.navigate(Direction::Next).unwrap();
        assert_eq!(session.state().pending_days, None);

        session.select_days(2).unwrap();
        session.jump_to(0).unwrap();
        assert_eq!(session.state().pending_days, None);
    }

    #[test]
    fn day_bounds_are_enforced_without_mutation() {
        let mut session = session();
        let before = session.clone();
        assert_eq!(
            session.select_days(0).unwrap_err(),
            PlannerError::InvalidSelection(InvalidSelection::DaysOutOfRange {
                requested: 0,
                remaining: 7
            })
        );
        assert!(session.select_days(8).is_err());
        assert_eq!(
            session.commit().unwrap_err(),
            PlannerError::InvalidSelection(InvalidSelection::NoPendingDays)
        );
        assert!(matches!(
            session.jump_to(3),
            Err(PlannerError::OutOfRange { index: 3, len: 3, .. })
        ));
        assert_eq!(session, before);

        session.select_days(5).unwrap();
        session.commit().unwrap();
        assert!(session.select_days(3).is_err());
        session.select_days(2).unwrap();
    }

    #[test]
    fn filling_a_quota_advances_to_the_next_category() {
        let mut session = session();
        session.select_days(4).unwrap();
        session.commit().unwrap();
        session.select_days(3).unwrap();
        let outcome = session.commit().unwrap();

        assert!(outcome.category_completed);
        assert_eq!(
            outcome.phase,
            PlannerPhase::Selecting {
                category: Category::Snack1
            }
        );
        assert_eq!(session.state().current_menu_index, 0);
        assert!(session.can_undo());
    }

    #[test]
    fn final_dinner_commit_completes_the_plan() {
        let mut session = session();
        for _ in 0..4 {
            session.select_days(7).unwrap();
            session.commit().unwrap();
        }
        assert!(session.view().is_last_category);
        session.select_days(4).unwrap();
        session.commit().unwrap();
        session.select_days(3).unwrap();
        assert!(session.view().completes_plan);
        let outcome = session.commit().unwrap();

        assert_eq!(outcome.phase, PlannerPhase::AllComplete);
        assert!(session.state().is_complete());
        assert_eq!(
            session.navigate(Direction::Next).unwrap_err(),
            PlannerError::InvalidSelection(InvalidSelection::PlanComplete)
        );
        assert!(session.select_days(1).is_err());

        assert!(matches!(session.undo(), UndoOutcome::Reverted(_)));
        assert_eq!(
            session.phase(),
            PlannerPhase::Selecting {
                category: Category::Dinner
            }
        );
    }

    #[test]
    fn undo_across_a_category_boundary_returns_to_the_previous_category() {
        let mut session = session();
        session.navigate(Direction::Next).unwrap();
        session.select_days(7).unwrap();
        session.commit().unwrap();
        assert_eq!(session.state().current_category(), Some(Category::Snack1));

        session.undo();
        assert_eq!(session.state().current_category(), Some(Category::Breakfast));
        assert_eq!(session.state().current_menu_index, 1);
        assert_eq!(pool_names(&session, Category::Breakfast), vec!["A", "B", "C"]);
    }

    #[test]
    fn undo_clears_pending_before_reverting() {
        let mut session = session();
        assert!(!session.can_undo());
        assert_eq!(session.undo(), UndoOutcome::NothingToUndo);

        session.select_days(2).unwrap();
        session.commit().unwrap();
        session.select_days(1).unwrap();
        assert_eq!(session.undo(), UndoOutcome::ClearedPending);
        assert_eq!(session.state().used_days(Category::Breakfast), 2);
        assert!(matches!(session.undo(), UndoOutcome::Reverted(_)));
        assert!(!session.can_undo());
    }

    #[test]
    fn empty_pools_are_skipped_and_end_exhausted() {
        let pool = MenuPool::from_ordered([
            (Category::Breakfast, Vec::new()),
            (Category::Snack1, entries(&["S"])),
        ]);
        let mut session = PlannerSession::from_parts(SelectionState::default(), pool, 0);
        assert_eq!(session.state().current_category(), Some(Category::Snack1));

        session.select_days(2).unwrap();
        let outcome = session.commit().unwrap();
        assert!(!outcome.category_completed);
        match outcome.phase {
            PlannerPhase::Exhausted { incomplete } => assert_eq!(incomplete.len(), 5),
            other => panic!("unexpected phase {other:?}"),
        }
        assert_eq!(
            session.commit().unwrap_err(),
            PlannerError::InvalidSelection(InvalidSelection::PlanComplete)
        );
    }

    #[test]
    fn all_empty_catalog_terminates_immediately() {
        let session = PlannerSession::new(&MenuCatalog::empty(), 5);
        assert_eq!(session.state().current_category(), None);
        assert!(matches!(session.phase(), PlannerPhase::Exhausted { .. }));
        assert!(session.view().pool.is_empty());
    }

    #[test]
    fn reseeding_withdraws_committed_menus() {
        let catalog = MenuCatalog::empty()
            .with_bucket(SourceBucket::Breakfast, entries(&["A", "B", "C"]));
        let mut session = PlannerSession::new(&catalog, 11);
        session.select_days(2).unwrap();
        let committed = session.commit().unwrap().selection.menu_name;

        let (state, _, _) = session.into_parts();
        let resumed = PlannerSession::reseeded(state, &catalog, 12);
        assert_eq!(resumed.pool().len(Category::Breakfast), 2);
        assert!(!pool_names(&resumed, Category::Breakfast).contains(&committed));
        assert!(resumed.state().undo_history.is_empty());
        assert_eq!(resumed.state().used_days(Category::Breakfast), 2);
    }

    #[test]
    fn events_dispatch_to_operations() {
        let catalog = MenuCatalog::empty()
            .with_bucket(SourceBucket::Breakfast, entries(&["A", "B"]));
        let mut session = PlannerSession::new(&catalog, 3);

        assert_eq!(
            session.apply(PlannerEvent::NavigateNext, &catalog).unwrap(),
            PlannerOutcome::Navigated(1)
        );
        assert_eq!(
            session.apply(PlannerEvent::ChooseDays(3), &catalog).unwrap(),
            PlannerOutcome::DaysChosen(3)
        );
        assert_eq!(
            session.apply(PlannerEvent::ClearDays, &catalog).unwrap(),
            PlannerOutcome::DaysCleared(true)
        );
        session.apply(PlannerEvent::ChooseDays(3), &catalog).unwrap();
        assert!(matches!(
            session.apply(PlannerEvent::Commit, &catalog).unwrap(),
            PlannerOutcome::Committed(_)
        ));
        assert_eq!(
            session.apply(PlannerEvent::Restart(9), &catalog).unwrap(),
            PlannerOutcome::Restarted
        );
        assert_eq!(session.seed(), 9);
        assert_eq!(session.state().total_committed_days(), 0);
        assert_eq!(session.pool().len(Category::Breakfast), 2);
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: PlannerEvent =
            serde_json::from_str(r#"{"type": "chooseDays", "value": 4}"#).unwrap();
        assert_eq!(event, PlannerEvent::ChooseDays(4));
        let event: PlannerEvent = serde_json::from_str(r#"{"type": "undo"}"#).unwrap();
        assert_eq!(event, PlannerEvent::Undo);
    }
}
