use std::fmt;

use nutriplan_core::{PlannerEvent, PlannerPhase, PlannerView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Event picked by a [`PlannerPolicy`], with the reason for the log.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub event: PlannerEvent,
    pub rationale: &'static str,
}

impl PolicyDecision {
    const fn new(event: PlannerEvent, rationale: &'static str) -> Self {
        Self { event, rationale }
    }
}

/// Drives a planning session one event at a time.
pub trait PlannerPolicy {
    fn name(&self) -> &'static str;

    fn next_event(&mut self, view: &PlannerView) -> PolicyDecision;
}

/// Built-in ways of filling in a week.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanningStrategy {
    /// Take the menu under the cursor for the whole week.
    Greedy,
    /// Browse, then split each category over several menus.
    Browser,
    /// Undo every other commit.
    Indecisive,
    /// Anything goes, including events the planner must reject.
    Chaos,
}

impl PlanningStrategy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Greedy => "Greedy",
            Self::Browser => "Browser",
            Self::Indecisive => "Indecisive",
            Self::Chaos => "Chaos",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlannerPolicy> {
        match self {
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Browser => Box::new(BrowserPolicy::new(seed)),
            Self::Indecisive => Box::new(IndecisivePolicy::new(seed)),
            Self::Chaos => Box::new(ChaosPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PlanningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn commit_or_choose(view: &PlannerView, days: u8) -> PolicyDecision {
    match view.pending_days {
        Some(_) => PolicyDecision::new(PlannerEvent::Commit, "commit pending days"),
        None => PolicyDecision::new(PlannerEvent::ChooseDays(days), "choose days"),
    }
}

struct GreedyPolicy;

impl PlannerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn next_event(&mut self, view: &PlannerView) -> PolicyDecision {
        commit_or_choose(view, view.remaining_days)
    }
}

struct BrowserPolicy {
    rng: ChaCha20Rng,
}

impl BrowserPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlannerPolicy for BrowserPolicy {
    fn name(&self) -> &'static str {
        "Browser"
    }

    fn next_event(&mut self, view: &PlannerView) -> PolicyDecision {
        if view.pending_days.is_some() {
            return PolicyDecision::new(PlannerEvent::Commit, "commit pending days");
        }
        if !view.pool.is_empty() && self.rng.gen_bool(0.4) {
            let event = if self.rng.gen_bool(0.5) {
                PlannerEvent::NavigateNext
            } else {
                PlannerEvent::JumpTo(self.rng.gen_range(0..view.pool.len()))
            };
            return PolicyDecision::new(event, "browse");
        }
        let days = self.rng.gen_range(1..=view.remaining_days.clamp(1, 3));
        PolicyDecision::new(PlannerEvent::ChooseDays(days), "split the week")
    }
}

struct IndecisivePolicy {
    rng: ChaCha20Rng,
    just_committed: bool,
    second_guess: bool,
}

impl IndecisivePolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            just_committed: false,
            second_guess: true,
        }
    }
}

impl PlannerPolicy for IndecisivePolicy {
    fn name(&self) -> &'static str {
        "Indecisive"
    }

    fn next_event(&mut self, view: &PlannerView) -> PolicyDecision {
        if std::mem::take(&mut self.just_committed) {
            self.second_guess = !self.second_guess;
            if !self.second_guess {
                return PolicyDecision::new(PlannerEvent::Undo, "second thoughts");
            }
        }
        if view.pending_days.is_some() {
            self.just_committed = true;
            return PolicyDecision::new(PlannerEvent::Commit, "commit pending days");
        }
        let days = self.rng.gen_range(1..=view.remaining_days.max(1));
        PolicyDecision::new(PlannerEvent::ChooseDays(days), "choose days")
    }
}

struct ChaosPolicy {
    rng: ChaCha20Rng,
}

impl ChaosPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlannerPolicy for ChaosPolicy {
    fn name(&self) -> &'static str {
        "Chaos"
    }

    fn next_event(&mut self, view: &PlannerView) -> PolicyDecision {
        let event = match self.rng.gen_range(0..100) {
            0..=11 => PlannerEvent::NavigatePrev,
            12..=23 => PlannerEvent::NavigateNext,
            24..=33 => PlannerEvent::JumpTo(self.rng.gen_range(0..=view.pool.len() + 1)),
            34..=53 => PlannerEvent::ChooseDays(self.rng.gen_range(0..=8)),
            54..=58 => PlannerEvent::ClearDays,
            59..=78 => PlannerEvent::Commit,
            79..=97 => PlannerEvent::Undo,
            _ if matches!(view.phase, PlannerPhase::AllComplete) => {
                PlannerEvent::Restart(self.rng.r#gen())
            }
            _ => PlannerEvent::Undo,
        };
        PolicyDecision::new(event, "random")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriplan_core::{Category, MenuCatalog, PlannerSession, StaticCatalogSource};

    fn view() -> PlannerView {
        let json = r#"{
            "Breakfast": [
                { "menuName": "Avena", "dishes": [{ "name": "Avena", "ingredients": [] }] },
                { "menuName": "Molletes", "dishes": [{ "name": "Molletes", "ingredients": [] }] }
            ]
        }"#;
        let source = StaticCatalogSource::new().with_document("menus.json", json);
        let (catalog, _) = MenuCatalog::ingest(&source).expect("ingest");
        PlannerSession::new(&catalog, 1).view()
    }

    #[test]
    fn greedy_fills_the_category_in_one_commit() {
        let mut policy = PlanningStrategy::Greedy.create_policy(1);
        let mut view = view();
        assert_eq!(view.category, Some(Category::Breakfast));
        let decision = policy.next_event(&view);
        assert!(matches!(decision.event, PlannerEvent::ChooseDays(7)));
        view.pending_days = Some(7);
        assert!(matches!(policy.next_event(&view).event, PlannerEvent::Commit));
    }

    #[test]
    fn indecisive_undoes_every_other_commit() {
        let mut policy = PlanningStrategy::Indecisive.create_policy(3);
        let mut view = view();
        view.pending_days = Some(1);
        let events: Vec<PlannerEvent> = (0..8).map(|_| policy.next_event(&view).event).collect();
        use PlannerEvent::{Commit, Undo};
        assert_eq!(events, vec![Commit, Undo, Commit, Commit, Undo, Commit, Commit, Undo]);
    }

    #[test]
    fn seeded_policies_repeat_their_choices() {
        let view = view();
        for strategy in [PlanningStrategy::Browser, PlanningStrategy::Chaos] {
            let mut first = strategy.create_policy(9);
            let mut second = strategy.create_policy(9);
            for _ in 0..20 {
                assert_eq!(
                    first.next_event(&view).event,
                    second.next_event(&view).event
                );
            }
        }
    }
}
