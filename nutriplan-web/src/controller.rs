//! Event handling between the rendering layer and the planner engine.

use nutriplan_core::{
    PlannerEngine, PlannerEvent, PlannerOutcome, PlannerStorage, PlannerView, UndoOutcome,
};
use serde::Serialize;

use crate::notices;

/// Everything the renderer needs after one event: what happened, the fresh
/// view, and an optional modal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub outcome: Option<PlannerOutcome>,
    pub view: PlannerView,
    pub notice: Option<String>,
    pub saved: bool,
}

/// Apply one event and translate the outcome into a renderer response.
///
/// Rejected events leave the session untouched and carry a notice instead of
/// an outcome.
pub fn dispatch<S: PlannerStorage>(
    engine: &mut PlannerEngine<S>,
    event: PlannerEvent,
) -> DispatchResult {
    match engine.apply(event) {
        Ok(response) => {
            let mut notice = notices::for_persistence(&response.persistence);
            if matches!(
                response.value,
                PlannerOutcome::Undone(UndoOutcome::NothingToUndo)
            ) {
                notice = notice.or(Some(notices::NOTHING_TO_UNDO));
            }
            DispatchResult {
                saved: response.persistence.is_saved(),
                outcome: Some(response.value),
                view: engine.view(),
                notice: notice.map(str::to_string),
            }
        }
        Err(err) => {
            log::debug!("rejected {event:?}: {err}");
            DispatchResult {
                outcome: None,
                view: engine.view(),
                notice: Some(notices::for_error(&err).to_string()),
                saved: true,
            }
        }
    }
}
