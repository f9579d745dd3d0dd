//! Read-only view of a summary opened from a share link.

use nutriplan_core::{PlanSummary, PlannerError, decode_share_token, token_from_fragment};

/// Summary carried by a location hash, if the hash is a share fragment.
///
/// A shared summary never touches the visitor's own saved plan.
///
/// # Errors
///
/// Returns [`PlannerError::Decode`] if the fragment holds a broken token.
pub fn summary_from_hash(hash: &str, prefix: &str) -> Result<Option<PlanSummary>, PlannerError> {
    let Some(token) = token_from_fragment(hash, prefix) else {
        return Ok(None);
    };
    let state = decode_share_token(token)?;
    Ok(Some(PlanSummary::from_state(&state)))
}
