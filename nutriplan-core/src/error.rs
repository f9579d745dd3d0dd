use serde::Serialize;
use thiserror::Error;

use crate::category::Category;

/// Reasons a day selection or commit is rejected. State is left unchanged.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error("no pending day count to commit")]
    NoPendingDays,
    #[error("day count {requested} outside 1..={remaining}")]
    DaysOutOfRange { requested: u8, remaining: u8 },
    #[error("no menus left for {0}")]
    EmptyPool(Category),
    #[error("no category is left to plan")]
    PlanComplete,
}

/// Errors raised by the planner engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    /// An index did not address the current pool. The controller keeps its own
    /// indices in range, so hitting this points at a broken invariant.
    #[error("index {index} out of range for {category} pool of {len}")]
    OutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] InvalidSelection),
    #[error("could not encode shared summary: {0}")]
    Encode(String),
    #[error("could not decode shared summary: {0}")]
    Decode(String),
    #[error("could not persist planner state: {0}")]
    Persistence(String),
}

/// A menu document that could not be ingested. Non-fatal: ingestion continues.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{document}: {reason}")]
pub struct IngestionError {
    pub document: String,
    pub reason: String,
}

impl IngestionError {
    #[must_use]
    pub fn new(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when planner configuration is inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("share prefix must start with '#' (got {0:?})")]
    SharePrefix(String),
}
