use nutriplan_core::constants::SHARE_FRAGMENT_PREFIX;
use nutriplan_core::{
    Category, MemoryStorage, PlannerConfig, PlannerEngine, PlannerEvent, PlannerOutcome, PlannerPhase,
    SessionOrigin,
};
use nutriplan_web::notices;
use nutriplan_web::shared::summary_from_hash;
use nutriplan_web::{dispatch, load_embedded_catalog};

fn engine(storage: &MemoryStorage, seed: u64) -> PlannerEngine<MemoryStorage> {
    let (catalog, _) = load_embedded_catalog().expect("embedded catalog");
    PlannerEngine::resume(storage.clone(), catalog, seed)
}

#[test]
fn a_week_planned_through_events_survives_a_reload() {
    let storage = MemoryStorage::new();
    let mut planner = engine(&storage, 5);
    assert_eq!(planner.origin(), SessionOrigin::Fresh);

    for _ in Category::ORDER {
        let result = dispatch(&mut planner, PlannerEvent::ChooseDays(7));
        assert_eq!(result.notice, None);
        let result = dispatch(&mut planner, PlannerEvent::Commit);
        assert!(matches!(result.outcome, Some(PlannerOutcome::Committed(_))));
    }
    assert_eq!(planner.view().phase, PlannerPhase::AllComplete);

    let reloaded = engine(&storage, 99);
    assert_eq!(reloaded.origin(), SessionOrigin::Restored);
    assert_eq!(reloaded.session(), planner.session());
    assert_eq!(reloaded.summary_text(), planner.summary_text());
}

#[test]
fn events_after_completion_are_rejected_with_a_notice() {
    let storage = MemoryStorage::new();
    let mut planner = engine(&storage, 8);
    for _ in Category::ORDER {
        dispatch(&mut planner, PlannerEvent::ChooseDays(7));
        dispatch(&mut planner, PlannerEvent::Commit);
    }
    let result = dispatch(&mut planner, PlannerEvent::NavigateNext);
    assert_eq!(result.outcome, None);
    assert_eq!(result.notice.as_deref(), Some(notices::PLAN_COMPLETE));
}

#[test]
fn share_link_opens_the_same_summary() {
    let storage = MemoryStorage::new();
    let mut planner = engine(&storage, 21);
    dispatch(&mut planner, PlannerEvent::ChooseDays(3));
    dispatch(&mut planner, PlannerEvent::Commit);
    dispatch(&mut planner, PlannerEvent::ChooseDays(4));
    dispatch(&mut planner, PlannerEvent::Commit);

    let url = planner
        .share_url("https://example.test/planner/", SHARE_FRAGMENT_PREFIX)
        .expect("share url");
    let hash = &url[url.find('#').expect("fragment")..];
    let summary = summary_from_hash(hash, SHARE_FRAGMENT_PREFIX)
        .expect("decodes")
        .expect("is a share");
    assert_eq!(summary.to_text(), planner.summary_text());
}

#[test]
fn configured_share_prefix_round_trips() {
    let config = PlannerConfig::from_json(r##"{"sharePrefix": "#plan:"}"##).expect("config");
    config.validate().expect("valid config");

    let storage = MemoryStorage::new();
    let mut planner = engine(&storage, 8);
    dispatch(&mut planner, PlannerEvent::ChooseDays(5));
    dispatch(&mut planner, PlannerEvent::Commit);

    let url = planner
        .share_url("https://example.test/planner/", &config.share_prefix)
        .expect("share url");
    let hash = &url[url.find('#').expect("fragment")..];
    assert!(hash.starts_with("#plan:"), "{hash}");
    assert_eq!(summary_from_hash(hash, SHARE_FRAGMENT_PREFIX), Ok(None));
    let summary = summary_from_hash(hash, &config.share_prefix)
        .expect("decodes")
        .expect("is a share");
    assert_eq!(summary.to_text(), planner.summary_text());
}

#[test]
fn corrupt_storage_is_replaced_with_a_fresh_plan() {
    let storage = MemoryStorage::new();
    storage.set_raw("{ not json");
    let planner = engine(&storage, 2);
    assert_eq!(planner.origin(), SessionOrigin::Replaced);
    assert!(!planner.view().can_undo);
    assert!(storage.raw().is_some_and(|raw| raw.starts_with('{') && raw != "{ not json"));
}
