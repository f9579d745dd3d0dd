//! Weekly summary, both structured and as copyable plain text.

use serde::Serialize;
use std::fmt::Write as _;

use crate::category::Category;
use crate::menu::{CommittedSelection, Ingredient};
use crate::state::SelectionState;

/// Heading of the summary view and first line of the copied text.
pub const SUMMARY_TITLE: &str = "Resumen de tu Semana";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub category: Category,
    pub heading: &'static str,
    pub selections: Vec<CommittedSelection>,
}

/// Committed selections grouped by category, in traversal order.
/// Categories without commits are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub title: &'static str,
    pub sections: Vec<SummarySection>,
    pub complete: bool,
}

impl PlanSummary {
    #[must_use]
    pub fn from_state(state: &SelectionState) -> Self {
        let sections = Category::ORDER
            .into_iter()
            .filter_map(|category| {
                let selections = state.committed_for(category);
                (!selections.is_empty()).then(|| SummarySection {
                    category,
                    heading: category.display_name(),
                    selections: selections.to_vec(),
                })
            })
            .collect();
        Self {
            title: SUMMARY_TITLE,
            sections,
            complete: state.is_complete(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Plain-text rendering for the clipboard.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = format!("{}\n\n", self.title);
        for section in &self.sections {
            let _ = writeln!(text, "{}", section.heading);
            for selection in &section.selections {
                let _ = writeln!(
                    text,
                    "  {} - {} {}",
                    selection.menu_name,
                    selection.days_used,
                    selection.day_word()
                );
                for dish in &selection.dishes {
                    let _ = writeln!(text, "    {}", dish.name);
                    for ingredient in &dish.ingredients {
                        let _ = writeln!(text, "      {}", ingredient_line(ingredient));
                    }
                }
                text.push('\n');
            }
            text.push('\n');
        }
        let mut text = text.trim().to_string();
        text.push('\n');
        text
    }
}

fn ingredient_line(ingredient: &Ingredient) -> String {
    let mut line = ingredient.name.clone();
    for label in [ingredient.metric_label(), ingredient.alternative_label()]
        .into_iter()
        .flatten()
    {
        line.push_str(" | ");
        line.push_str(&label);
    }
    line
}

/// Copyable summary text for `state`.
#[must_use]
pub fn summary_text(state: &SelectionState) -> String {
    PlanSummary::from_state(state).to_text()
}
