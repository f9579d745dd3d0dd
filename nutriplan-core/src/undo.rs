use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::menu::MenuEntry;

/// Complete inverse-apply descriptor for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoRecord {
    pub category: Category,
    pub menu: MenuEntry,
    /// Index the menu occupied in its pool before removal.
    pub menu_index: usize,
    pub days_used: u8,
    pub previous_category_index: usize,
    pub previous_menu_index: usize,
}

/// Unbounded LIFO history of commits. There is no redo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct UndoLog {
    records: Vec<UndoRecord>,
}

impl UndoLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop()
    }

    #[must_use]
    pub fn last(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &UndoRecord> {
        self.records.iter()
    }

    /// Records that belong to `category`, oldest first.
    pub fn for_category(&self, category: Category) -> impl Iterator<Item = &UndoRecord> {
        self.records
            .iter()
            .filter(move |record| record.category == category)
    }

    /// Days committed to `category` that this log can still revert.
    #[must_use]
    pub fn days_in_flight(&self, category: Category) -> u32 {
        self.for_category(category)
            .map(|record| u32::from(record.days_used))
            .sum()
    }
}
