//! User-facing messages shown in the modal dialog.

use nutriplan_core::{InvalidSelection, Persistence, PlannerError};

pub const NOTHING_TO_UNDO: &str = "No hay acciones para deshacer.";
pub const INVALID_SELECTION: &str = "Selección inválida.";
pub const CHOOSE_DAYS_FIRST: &str = "Elige cuántos días antes de confirmar.";
pub const PLAN_COMPLETE: &str = "Tu semana ya está completa.";
pub const RESTART_CONFIRM: &str = "¿Estás seguro de reiniciar todo?";
pub const SHARE_DECODE_FAILED: &str = "No se pudo decodificar el resumen compartido.";
pub const SUMMARY_COPIED: &str = "¡Resumen copiado al portapapeles!";
pub const SUMMARY_COPY_FAILED: &str = "Hubo un error al copiar el resumen.";
pub const LINK_COPIED: &str = "Link de resumen copiado al portapapeles!";
pub const LINK_COPY_FAILED: &str = "Ocurrió un error al copiar el link.";
pub const SAVE_FAILED: &str =
    "No se pudo guardar tu progreso. Si recargas la página podrías perder el último cambio.";
pub const CATALOG_FAILED: &str =
    "Error al cargar la lista de archivos JSON. Asegúrate de que json_directory.json existe.";

/// Message for a rejected planner operation.
#[must_use]
pub fn for_error(error: &PlannerError) -> &'static str {
    match error {
        PlannerError::InvalidSelection(InvalidSelection::NoPendingDays) => CHOOSE_DAYS_FIRST,
        PlannerError::InvalidSelection(InvalidSelection::PlanComplete) => PLAN_COMPLETE,
        PlannerError::InvalidSelection(_) | PlannerError::OutOfRange { .. } => INVALID_SELECTION,
        PlannerError::Decode(_) => SHARE_DECODE_FAILED,
        PlannerError::Encode(_) => LINK_COPY_FAILED,
        PlannerError::Persistence(_) => SAVE_FAILED,
    }
}

/// Warning for a failed write-through, if any.
#[must_use]
pub fn for_persistence(persistence: &Persistence) -> Option<&'static str> {
    match persistence {
        Persistence::Saved => None,
        Persistence::Failed(_) => Some(SAVE_FAILED),
    }
}
