use anyhow::{Result, ensure};
use nutriplan_core::constants::DAYS_PER_CATEGORY;
use nutriplan_core::summary::SUMMARY_TITLE;
use nutriplan_core::{Category, PlannerPhase, SourceBucket};

use crate::logic::{PlanningStrategy, RunSummary, SessionPlan, StorageKind};

/// A named [`SessionPlan`] run once per seed and iteration.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SessionPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SessionPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

struct ScenarioEntry {
    key: &'static str,
    description: &'static str,
    build: fn() -> SessionPlan,
}

const SCENARIOS: &[ScenarioEntry] = &[
    ScenarioEntry {
        key: "smoke",
        description: "One menu per category for the whole week",
        build: smoke,
    },
    ScenarioEntry {
        key: "full-plan",
        description: "Browse and split every category across several menus",
        build: full_plan,
    },
    ScenarioEntry {
        key: "undo-roundtrip",
        description: "Commit and undo at random, then undo back to a fresh session",
        build: undo_roundtrip,
    },
    ScenarioEntry {
        key: "persistence-resume",
        description: "Reload from storage after every step and compare",
        build: persistence_resume,
    },
    ScenarioEntry {
        key: "file-persistence",
        description: "Like persistence-resume, against a JSON file on disk",
        build: file_persistence,
    },
    ScenarioEntry {
        key: "share-roundtrip",
        description: "Decode the share link and compare its summary",
        build: share_roundtrip,
    },
    ScenarioEntry {
        key: "empty-category",
        description: "Lunch bucket missing: the plan ends exhausted, not stuck",
        build: empty_category,
    },
    ScenarioEntry {
        key: "chaos",
        description: "Random events, including invalid ones, with invariant checks",
        build: chaos,
    },
];

/// `(key, description)` for every registered scenario.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|entry| (entry.key, entry.description))
        .collect()
}

pub fn scenario_keys() -> Vec<String> {
    SCENARIOS.iter().map(|entry| entry.key.to_string()).collect()
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.trim().to_lowercase();
    SCENARIOS
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| TestScenario::new(entry.key, (entry.build)()))
}

fn expect_complete(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.phase == PlannerPhase::AllComplete,
        "plan should be complete, ended {:?}",
        summary.phase
    );
    let expected = u32::from(DAYS_PER_CATEGORY) * u32::try_from(Category::COUNT).unwrap_or(0);
    ensure!(
        summary.final_state.total_committed_days() == expected,
        "expected {expected} committed days, got {}",
        summary.final_state.total_committed_days()
    );
    Ok(())
}

fn expect_summary_lists_every_category(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.summary_text.starts_with(SUMMARY_TITLE),
        "summary text missing its title"
    );
    for category in Category::ORDER {
        ensure!(
            summary.summary_text.contains(category.display_name()),
            "summary text missing {category}"
        );
    }
    Ok(())
}

fn expect_some_undos(summary: &RunSummary) -> Result<()> {
    ensure!(
        summary.commits == 0 || summary.undos > 0,
        "indecisive run never undid a commit"
    );
    Ok(())
}

fn expect_lunch_exhausted(summary: &RunSummary) -> Result<()> {
    match &summary.phase {
        PlannerPhase::Exhausted { incomplete } => {
            ensure!(
                incomplete == &[Category::Lunch],
                "only lunch should be incomplete, got {incomplete:?}"
            );
            ensure!(
                summary.final_state.committed_for(Category::Lunch).is_empty(),
                "lunch has commits without menus"
            );
            Ok(())
        }
        other => anyhow::bail!("expected an exhausted plan, ended {other:?}"),
    }
}

fn smoke() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Greedy)
        .with_expectation(expect_complete)
        .with_expectation(expect_summary_lists_every_category)
}

fn full_plan() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Browser).with_max_steps(400)
}

fn undo_roundtrip() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Indecisive)
        .with_unwind()
        .with_expectation(expect_some_undos)
}

fn persistence_resume() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Browser).with_reloads()
}

fn file_persistence() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Indecisive)
        .with_storage(StorageKind::File)
        .with_reloads()
}

fn share_roundtrip() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Browser).with_share_check()
}

fn empty_category() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Greedy)
        .without_bucket(SourceBucket::Lunch)
        .with_expectation(expect_lunch_exhausted)
}

fn chaos() -> SessionPlan {
    SessionPlan::new(PlanningStrategy::Chaos)
        .keep_going()
        .with_max_steps(300)
        .with_reloads()
        .with_share_check()
        .with_unwind()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            assert!(!description.is_empty());
            let scenario = get_scenario(key).expect("registered");
            assert_eq!(scenario.name, key);
        }
        assert!(get_scenario(" SMOKE ").is_some());
        assert!(get_scenario("boss-fight").is_none());
    }
}
