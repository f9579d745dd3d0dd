//! Shared-summary links.
//!
//! A link carries the committed selections as base64 JSON in the URL
//! fragment: `<page><prefix><token>`, `#share=` unless configured
//! otherwise. Decoding either yields a repaired
//! [`SelectionState`] or a [`PlannerError::Decode`]; nothing is applied
//! partially.

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};

use crate::constants::LOG_TARGET_PLANNER;
use crate::error::PlannerError;
use crate::state::SelectionState;

/// Encode the shareable part of `state` as a token.
///
/// # Errors
///
/// Returns [`PlannerError::Encode`] if the state cannot be serialized.
pub fn encode_share_token(state: &SelectionState) -> Result<String, PlannerError> {
    let json = serde_json::to_vec(&state.for_sharing())
        .map_err(|err| PlannerError::Encode(err.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Decode a token produced by [`encode_share_token`].
///
/// Tokens that went through a URL-safe rewrite (`-`/`_`, no padding) are
/// accepted as well.
///
/// # Errors
///
/// Returns [`PlannerError::Decode`] if the token is not base64 or does not
/// hold a selection state.
pub fn decode_share_token(token: &str) -> Result<SelectionState, PlannerError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(PlannerError::Decode("empty share token".to_string()));
    }
    let bytes = STANDARD
        .decode(token)
        .or_else(|_| URL_SAFE_NO_PAD.decode(token.trim_end_matches('=')))
        .map_err(|err| PlannerError::Decode(err.to_string()))?;
    let mut state: SelectionState =
        serde_json::from_slice(&bytes).map_err(|err| PlannerError::Decode(err.to_string()))?;

    let report = state.repair();
    if !report.is_clean() {
        log::warn!(target: LOG_TARGET_PLANNER, "shared summary needed repair: {report:?}");
    }
    Ok(state.for_sharing())
}

/// `<prefix><token>`, e.g. `#share=<token>`.
#[must_use]
pub fn share_fragment(prefix: &str, token: &str) -> String {
    format!("{prefix}{token}")
}

/// Full share link for `state` below `base_url` (origin plus path).
///
/// # Errors
///
/// Propagates [`encode_share_token`] failures.
pub fn share_url(
    base_url: &str,
    prefix: &str,
    state: &SelectionState,
) -> Result<String, PlannerError> {
    let token = encode_share_token(state)?;
    let base = base_url.split('#').next().unwrap_or(base_url);
    Ok(format!("{base}{}", share_fragment(prefix, &token)))
}

/// Extract the token from a location hash, if it starts with `prefix`.
#[must_use]
pub fn token_from_fragment<'a>(hash: &'a str, prefix: &str) -> Option<&'a str> {
    hash.strip_prefix(prefix)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::constants::SHARE_FRAGMENT_PREFIX;
    use crate::menu::{CommittedSelection, Dish, Ingredient, MenuEntry};
    use crate::summary::summary_text;

    fn planned_state() -> SelectionState {
        let entry = MenuEntry::new(
            "Pozole",
            vec![Dish {
                name: "Pozole verde".into(),
                ingredients: vec![Ingredient::named("Maíz").with_metric(150_u32, "g")],
            }],
        );
        let mut state = SelectionState::default();
        state
            .committed
            .entry(Category::Lunch)
            .or_default()
            .push(CommittedSelection::from_entry(&entry, 4));
        state.completed_days.insert(Category::Lunch, 4);
        state.current_category_index = 2;
        state.pending_days = Some(2);
        state
    }

    #[test]
    fn token_reconstructs_committed_selections() {
        let state = planned_state();
        let token = encode_share_token(&state).unwrap();
        let decoded = decode_share_token(&token).unwrap();

        assert_eq!(decoded.committed, state.committed);
        assert_eq!(decoded.pending_days, None);
        assert!(decoded.undo_history.is_empty());
        assert_eq!(summary_text(&decoded), summary_text(&state));
    }

    #[test]
    fn url_safe_tokens_are_accepted() {
        let token = encode_share_token(&planned_state()).unwrap();
        let rewritten = token.replace('+', "-").replace('/', "_");
        let rewritten = rewritten.trim_end_matches('=');
        assert!(decode_share_token(rewritten).is_ok());
    }

    #[test]
    fn malformed_tokens_fail_with_decode_error() {
        for token in ["", "***", "bm90IGpzb24=", "WzEsMl0="] {
            assert!(
                matches!(decode_share_token(token), Err(PlannerError::Decode(_))),
                "{token:?} should not decode"
            );
        }
    }

    #[test]
    fn decoded_state_is_repaired() {
        let json = r#"{"committed": {"dinner": [{"menuName": "Sopa", "daysUsed": 2}]},
                       "completedDays": {"dinner": 6}}"#;
        let token = STANDARD.encode(json);
        let state = decode_share_token(&token).unwrap();
        assert_eq!(state.used_days(Category::Dinner), 2);
        assert_eq!(state.committed.len(), 5);
    }

    #[test]
    fn url_and_fragment_helpers_agree() {
        let state = planned_state();
        let url =
            share_url("https://plan.example/app/#old", SHARE_FRAGMENT_PREFIX, &state).unwrap();
        assert!(url.starts_with("https://plan.example/app/#share="));

        let hash = &url[url.find('#').unwrap()..];
        let token = token_from_fragment(hash, SHARE_FRAGMENT_PREFIX).unwrap();
        assert_eq!(decode_share_token(token).unwrap().committed, state.committed);

        assert_eq!(token_from_fragment("#share=", SHARE_FRAGMENT_PREFIX), None);
        assert_eq!(token_from_fragment("#other", SHARE_FRAGMENT_PREFIX), None);
        assert_eq!(share_fragment(SHARE_FRAGMENT_PREFIX, "abc"), "#share=abc");
    }

    #[test]
    fn custom_prefix_links_open_with_the_same_prefix() {
        let state = planned_state();
        let url = share_url("https://plan.example/app/", "#plan:", &state).unwrap();
        assert!(url.starts_with("https://plan.example/app/#plan:"));

        let hash = &url[url.find('#').unwrap()..];
        assert_eq!(token_from_fragment(hash, SHARE_FRAGMENT_PREFIX), None);
        let token = token_from_fragment(hash, "#plan:").unwrap();
        assert_eq!(decode_share_token(token).unwrap().committed, state.committed);
    }
}
