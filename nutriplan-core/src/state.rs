use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::constants::{DAYS_PER_CATEGORY, LOG_TARGET_PLANNER, MIN_DAYS_PER_COMMIT};
use crate::menu::CommittedSelection;
use crate::undo::UndoLog;

/// Durable record of planning progress.
///
/// Serialized field names follow the persisted blob layout (`completedDays`,
/// `currentCategoryIndex`, ...). Every field defaults, so a partial blob still
/// restores and [`SelectionState::repair`] fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    #[serde(default)]
    pub committed: BTreeMap<Category, Vec<CommittedSelection>>,
    #[serde(default)]
    pub completed_days: BTreeMap<Category, u8>,
    #[serde(default)]
    pub current_category_index: usize,
    #[serde(default)]
    pub current_menu_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_days: Option<u8>,
    #[serde(default)]
    pub undo_history: UndoLog,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            committed: Category::ORDER
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
            completed_days: Category::ORDER
                .into_iter()
                .map(|category| (category, 0))
                .collect(),
            current_category_index: 0,
            current_menu_index: 0,
            pending_days: None,
            undo_history: UndoLog::new(),
        }
    }
}

/// What [`SelectionState::repair`] had to change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepairReport {
    pub created_slots: Vec<Category>,
    pub recounted: Vec<Category>,
    pub dropped_selections: usize,
    pub category_index_clamped: bool,
    pub pending_dropped: bool,
    pub undo_history_dropped: bool,
}

impl RepairReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.created_slots.is_empty()
            && self.recounted.is_empty()
            && self.dropped_selections == 0
            && !self.category_index_clamped
            && !self.pending_dropped
            && !self.undo_history_dropped
    }
}

impl SelectionState {
    /// Active category, or `None` once the traversal is exhausted.
    #[must_use]
    pub fn current_category(&self) -> Option<Category> {
        Category::from_index(self.current_category_index)
    }

    #[must_use]
    pub fn committed_for(&self, category: Category) -> &[CommittedSelection] {
        self.committed
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn used_days(&self, category: Category) -> u8 {
        self.completed_days.get(&category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn remaining_days(&self, category: Category) -> u8 {
        DAYS_PER_CATEGORY.saturating_sub(self.used_days(category))
    }

    /// Every category has reached its quota. Evaluated on demand, never cached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Category::ORDER
            .into_iter()
            .all(|category| self.used_days(category) == DAYS_PER_CATEGORY)
    }

    /// Categories still short of their quota.
    #[must_use]
    pub fn incomplete_categories(&self) -> Vec<Category> {
        Category::ORDER
            .into_iter()
            .filter(|category| self.remaining_days(*category) > 0)
            .collect()
    }

    #[must_use]
    pub fn total_committed_days(&self) -> u32 {
        self.completed_days.values().copied().map(u32::from).sum()
    }

    /// Copy without session-only fields, suitable for a shared summary.
    #[must_use]
    pub fn for_sharing(&self) -> Self {
        Self {
            committed: self.committed.clone(),
            completed_days: self.completed_days.clone(),
            current_category_index: self.current_category_index,
            current_menu_index: 0,
            pending_days: None,
            undo_history: UndoLog::new(),
        }
    }

    pub(crate) fn record_commit(&mut self, category: Category, selection: CommittedSelection) {
        let days = self.used_days(category).saturating_add(selection.days_used);
        self.completed_days
            .insert(category, days.min(DAYS_PER_CATEGORY));
        self.committed.entry(category).or_default().push(selection);
    }

    pub(crate) fn revert_commit(&mut self, category: Category, days_used: u8) {
        let days = self.used_days(category).saturating_sub(days_used);
        self.completed_days.insert(category, days);
        if let Some(selections) = self.committed.get_mut(&category) {
            selections.pop();
        }
    }

    /// Restore every invariant that does not depend on the menu pool.
    ///
    /// Counters are rebuilt from the committed lists, which are the source of
    /// truth. Zero-day selections and selections beyond the weekly quota are
    /// dropped. An undo history that no longer matches the committed lists is
    /// discarded as a whole, since replaying it would corrupt the pool.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        for category in Category::ORDER {
            if !self.committed.contains_key(&category) || !self.completed_days.contains_key(&category)
            {
                report.created_slots.push(category);
            }
            let selections = self.committed.entry(category).or_default();

            let before = selections.len();
            selections.retain(|selection| selection.days_used >= MIN_DAYS_PER_COMMIT);
            let mut total: u32 = 0;
            selections.retain(|selection| {
                let next = total + u32::from(selection.days_used);
                let keep = next <= u32::from(DAYS_PER_CATEGORY);
                if keep {
                    total = next;
                }
                keep
            });
            report.dropped_selections += before - selections.len();

            let sum: u8 = selections.iter().map(|selection| selection.days_used).sum();
            let counter = self.completed_days.entry(category).or_insert(sum);
            if *counter != sum {
                log::warn!(
                    target: LOG_TARGET_PLANNER,
                    "{category}: completed days {counter} disagree with committed total {sum}"
                );
                *counter = sum;
                report.recounted.push(category);
            }
        }

        if self.current_category_index > Category::COUNT {
            self.current_category_index = Category::COUNT;
            report.category_index_clamped = true;
        }

        if let Some(pending) = self.pending_days {
            let remaining = self
                .current_category()
                .map_or(0, |category| self.remaining_days(category));
            if pending < MIN_DAYS_PER_COMMIT || pending > remaining {
                self.pending_days = None;
                report.pending_dropped = true;
            }
        }

        if !self.undo_history_matches_commits() {
            log::warn!(
                target: LOG_TARGET_PLANNER,
                "undo history does not match committed selections; discarding {} records",
                self.undo_history.len()
            );
            self.undo_history.clear();
            report.undo_history_dropped = true;
        }

        if report.dropped_selections > 0 {
            log::warn!(
                target: LOG_TARGET_PLANNER,
                "dropped {} invalid committed selections",
                report.dropped_selections
            );
        }
        report
    }

    /// Each category's undo records must mirror the tail of its committed list.
    fn undo_history_matches_commits(&self) -> bool {
        Category::ORDER.into_iter().all(|category| {
            let selections = self.committed_for(category);
            let records: Vec<_> = self.undo_history.for_category(category).collect();
            if records.len() > selections.len() {
                return false;
            }
            let tail = &selections[selections.len() - records.len()..];
            records.iter().zip(tail).all(|(record, selection)| {
                record.menu.menu_name == selection.menu_name
                    && record.days_used == selection.days_used
            }) && records
                .iter()
                .all(|record| record.previous_category_index == category.index())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Dish, MenuEntry};
    use crate::undo::UndoRecord;

    fn entry(name: &str) -> MenuEntry {
        MenuEntry::new(
            name,
            vec![Dish {
                name: format!("{name} dish"),
                ingredients: Vec::new(),
            }],
        )
    }

    fn commit(state: &mut SelectionState, category: Category, name: &str, days: u8) {
        let menu = entry(name);
        state.record_commit(category, CommittedSelection::from_entry(&menu, days));
        state.undo_history.push(UndoRecord {
            category,
            menu,
            menu_index: 0,
            days_used: days,
            previous_category_index: category.index(),
            previous_menu_index: 0,
        });
    }

    #[test]
    fn fresh_state_has_every_slot_and_nothing_committed() {
        let state = SelectionState::default();
        assert_eq!(state.current_category(), Some(Category::Breakfast));
        for category in Category::ORDER {
            assert_eq!(state.used_days(category), 0);
            assert_eq!(state.remaining_days(category), 7);
        }
        assert!(!state.is_complete());
        assert_eq!(state.incomplete_categories().len(), 5);
    }

    #[test]
    fn completion_requires_every_category_at_quota() {
        let mut state = SelectionState::default();
        for category in Category::ORDER {
            commit(&mut state, category, "full", 7);
        }
        assert!(state.is_complete());
        assert_eq!(state.total_committed_days(), 35);

        state.revert_commit(Category::Dinner, 7);
        assert!(!state.is_complete());
        assert_eq!(state.incomplete_categories(), vec![Category::Dinner]);
        assert!(state.committed_for(Category::Dinner).is_empty());
    }

    #[test]
    fn repair_fills_missing_slots_from_partial_blob() {
        let mut state: SelectionState =
            serde_json::from_str(r#"{"currentCategoryIndex": 2}"#).unwrap();
        let report = state.repair();
        assert_eq!(report.created_slots.len(), 5);
        assert_eq!(state.current_category(), Some(Category::Lunch));
        assert_eq!(state.committed.len(), 5);
        assert_eq!(state.completed_days.len(), 5);
    }

    #[test]
    fn repair_recounts_days_from_committed_lists() {
        let mut state = SelectionState::default();
        commit(&mut state, Category::Lunch, "L", 3);
        state.completed_days.insert(Category::Lunch, 6);

        let report = state.repair();
        assert_eq!(report.recounted, vec![Category::Lunch]);
        assert_eq!(state.used_days(Category::Lunch), 3);
        assert!(!report.undo_history_dropped);
    }

    #[test]
    fn repair_drops_selections_beyond_the_quota() {
        let mut state = SelectionState::default();
        for (name, days) in [("A", 4), ("B", 0), ("C", 3), ("D", 2)] {
            state
                .committed
                .entry(Category::Snack1)
                .or_default()
                .push(CommittedSelection::from_entry(&entry(name), days));
        }
        let report = state.repair();
        assert_eq!(report.dropped_selections, 2);
        let names: Vec<_> = state
            .committed_for(Category::Snack1)
            .iter()
            .map(|selection| selection.menu_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(state.used_days(Category::Snack1), 7);
    }

    #[test]
    fn repair_keeps_later_selections_that_still_fit() {
        let mut state = SelectionState::default();
        for (name, days) in [("A", 4), ("B", 5), ("C", 3)] {
            state
                .committed
                .entry(Category::Dinner)
                .or_default()
                .push(CommittedSelection::from_entry(&entry(name), days));
        }
        let report = state.repair();
        assert_eq!(report.dropped_selections, 1);
        let names: Vec<_> = state
            .committed_for(Category::Dinner)
            .iter()
            .map(|selection| selection.menu_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(state.used_days(Category::Dinner), 7);
    }

    #[test]
    fn repair_clamps_indices_and_pending_days() {
        let mut state = SelectionState {
            current_category_index: 42,
            pending_days: Some(3),
            ..SelectionState::default()
        };
        let report = state.repair();
        assert!(report.category_index_clamped);
        assert!(report.pending_dropped);
        assert_eq!(state.current_category(), None);
        assert_eq!(state.pending_days, None);

        let mut state = SelectionState::default();
        commit(&mut state, Category::Breakfast, "A", 5);
        state.pending_days = Some(3);
        assert!(state.repair().pending_dropped);
    }

    #[test]
    fn repair_discards_mismatched_undo_history() {
        let mut state = SelectionState::default();
        commit(&mut state, Category::Breakfast, "A", 2);
        state.committed.get_mut(&Category::Breakfast).unwrap()[0].menu_name = "Z".into();

        let report = state.repair();
        assert!(report.undo_history_dropped);
        assert!(state.undo_history.is_empty());
    }

    #[test]
    fn repair_is_a_no_op_on_consistent_state() {
        let mut state = SelectionState::default();
        commit(&mut state, Category::Breakfast, "A", 2);
        commit(&mut state, Category::Breakfast, "B", 1);
        state.pending_days = Some(4);
        assert!(state.repair().is_clean());
        assert_eq!(state.pending_days, Some(4));
    }

    #[test]
    fn sharing_copy_strips_session_fields() {
        let mut state = SelectionState::default();
        commit(&mut state, Category::Breakfast, "A", 2);
        state.pending_days = Some(1);
        state.current_menu_index = 3;

        let shared = state.for_sharing();
        assert!(shared.undo_history.is_empty());
        assert_eq!(shared.pending_days, None);
        assert_eq!(shared.current_menu_index, 0);
        assert_eq!(shared.committed, state.committed);
    }

    #[test]
    fn blob_round_trips_exactly() {
        let mut state = SelectionState::default();
        commit(&mut state, Category::Snack2, "N", 6);
        state.current_category_index = 3;
        state.pending_days = Some(1);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["completedDays"]["snack2"], 6);
        assert_eq!(value["pendingDays"], 1);
        let back: SelectionState = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, state);
        assert_eq!(serde_json::to_value(&back).unwrap(), value);
    }
}
