//! View-model pulled by the rendering layer after every transition.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::menu::MenuEntry;

/// Where the controller stands in the category traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlannerPhase {
    /// A category with candidates and days left is active.
    Selecting { category: Category },
    /// Every category reached its weekly quota.
    AllComplete,
    /// The traversal ran out of categories while some quotas are unmet,
    /// because their pools emptied first.
    Exhausted { incomplete: Vec<Category> },
}

impl PlannerPhase {
    #[must_use]
    pub const fn is_selecting(&self) -> bool {
        matches!(self, Self::Selecting { .. })
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_selecting()
    }
}

/// Snapshot of everything the renderer needs to draw the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerView {
    pub category: Option<Category>,
    pub used_days: u8,
    pub remaining_days: u8,
    pub pool: Vec<MenuEntry>,
    pub current_index: usize,
    pub pending_days: Option<u8>,
    pub can_undo: bool,
    pub phase: PlannerPhase,
    /// The active category is the final one in the traversal.
    pub is_last_category: bool,
    /// Committing the pending days would finish the whole plan.
    pub completes_plan: bool,
}

impl PlannerView {
    /// Menu under the cursor, if any.
    #[must_use]
    pub fn current_menu(&self) -> Option<&MenuEntry> {
        self.pool.get(self.current_index)
    }

    /// Day counts the day picker should offer, `1..=remaining_days`.
    pub fn day_choices(&self) -> impl Iterator<Item = u8> {
        1..=self.remaining_days
    }
}
