#![cfg(target_arch = "wasm32")]

use nutriplan_core::{PlannerEvent, PlannerStorage};
use nutriplan_web::bindings::WebPlanner;
use nutriplan_web::{LocalStorageBackend, dom};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const TEST_CONFIG: &str = r#"{ "storageKey": "nutriplan.browser-test" }"#;

fn clear_slot() {
    LocalStorageBackend::new("nutriplan.browser-test")
        .clear_snapshot()
        .expect("clear slot");
}

#[wasm_bindgen_test]
fn dom_helpers_reach_the_window() {
    assert!(dom::window().is_ok());
    assert!(dom::local_storage().is_ok());
    assert!(dom::page_base_url().expect("base url").starts_with("http"));
}

#[wasm_bindgen_test]
fn planner_writes_through_to_local_storage() {
    clear_slot();
    let mut planner = WebPlanner::new(Some(TEST_CONFIG.to_string())).expect("planner");
    let event = serde_wasm_bindgen::to_value(&PlannerEvent::ChooseDays(7)).expect("event");
    planner.dispatch(event).expect("choose days");
    let event = serde_wasm_bindgen::to_value(&PlannerEvent::Commit).expect("event");
    planner.dispatch(event).expect("commit");

    let stored = LocalStorageBackend::new("nutriplan.browser-test")
        .load_snapshot()
        .expect("readable")
        .expect("saved");
    assert_eq!(stored.state.total_committed_days(), 7);
    assert!(planner.summary_text().contains("Desayuno"));
    clear_slot();
}

#[wasm_bindgen_test]
fn plain_page_has_no_shared_summary() {
    assert_eq!(
        nutriplan_web::bindings::shared_summary().expect("readable hash"),
        JsValue::NULL
    );
}
