use anyhow::{Result, bail, ensure};
use nutriplan_core::constants::{DAYS_PER_CATEGORY, MIN_DAYS_PER_COMMIT};
use nutriplan_core::{Category, MenuCatalog, PlannerPhase, PlannerSession};

/// Check every structural rule a live session must satisfy.
pub fn check_session(session: &PlannerSession, catalog: &MenuCatalog) -> Result<()> {
    let state = session.state();
    let pool = session.pool();
    let mut commits = 0;

    for category in Category::ORDER {
        let selections = state.committed_for(category);
        commits += selections.len();
        let mut sum = 0_u32;
        for selection in selections {
            ensure!(
                (MIN_DAYS_PER_COMMIT..=DAYS_PER_CATEGORY).contains(&selection.days_used),
                "{category}: {} committed with {} days",
                selection.menu_name,
                selection.days_used
            );
            sum += u32::from(selection.days_used);
        }
        ensure!(
            u32::from(state.used_days(category)) == sum,
            "{category}: counter {} disagrees with committed sum {sum}",
            state.used_days(category)
        );
        ensure!(
            sum <= u32::from(DAYS_PER_CATEGORY),
            "{category}: {sum} days committed"
        );

        let mut expected: Vec<&str> = catalog
            .entries(category.source_bucket())
            .iter()
            .map(|entry| entry.menu_name.as_str())
            .collect();
        let mut actual: Vec<&str> = pool
            .entries(category)
            .iter()
            .map(|entry| entry.menu_name.as_str())
            .chain(selections.iter().map(|s| s.menu_name.as_str()))
            .collect();
        expected.sort_unstable();
        actual.sort_unstable();
        ensure!(
            expected == actual,
            "{category}: pool and commits no longer add up to the catalog"
        );
    }

    ensure!(
        state.undo_history.len() == commits,
        "undo history holds {} records for {commits} commits",
        state.undo_history.len()
    );
    ensure!(
        state.current_category_index <= Category::COUNT,
        "category index {} out of range",
        state.current_category_index
    );
    for category in Category::ORDER
        .into_iter()
        .take(state.current_category_index)
    {
        ensure!(
            state.remaining_days(category) == 0 || pool.is_empty(category),
            "{category} was left behind with {} days open",
            state.remaining_days(category)
        );
    }

    match session.phase() {
        PlannerPhase::Selecting { category } => {
            ensure!(
                category.index() == state.current_category_index,
                "active {category} does not match index {}",
                state.current_category_index
            );
            ensure!(!pool.is_empty(category), "active {category} has no menus");
            ensure!(
                state.current_menu_index < pool.len(category),
                "cursor {} beyond {} menus",
                state.current_menu_index,
                pool.len(category)
            );
            ensure!(
                state.remaining_days(category) > 0,
                "active {category} is already full"
            );
            if let Some(days) = state.pending_days {
                ensure!(
                    (1..=state.remaining_days(category)).contains(&days),
                    "pending {days} days outside 1..={}",
                    state.remaining_days(category)
                );
            }
        }
        PlannerPhase::AllComplete => {
            ensure!(state.is_complete(), "complete phase with open days");
            ensure!(state.pending_days.is_none(), "pending days after completion");
        }
        PlannerPhase::Exhausted { incomplete } => {
            if incomplete.is_empty() {
                bail!("exhausted without incomplete categories");
            }
            ensure!(state.pending_days.is_none(), "pending days after exhaustion");
        }
    }

    let view = session.view();
    ensure!(
        view.can_undo == (state.pending_days.is_some() || !state.undo_history.is_empty()),
        "undo availability out of sync"
    );
    Ok(())
}
