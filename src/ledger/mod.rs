//! State ledger
//!
//! Applies typed results to the character, the session tally and the
//! outstanding conditions. Effects gained mid-action are staged and only
//! become active at the action boundary.

pub mod conditions;
pub mod tally;

pub use conditions::Conditions;
pub use tally::{AGGREGATE_SLOT, Tally};

use crate::domain::{AdventureResult, Character, ResultKind, merge_into};

#[derive(Debug, Clone, Default)]
pub struct StateLedger {
    tally: Tally,
    recent_effects: Vec<AdventureResult>,
    active_effects: Vec<AdventureResult>,
    conditions: Conditions,
    use_disjunction: bool,
    /// Base stat points captured at reset
    baseline: [i64; 3],
}

impl StateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed the tally and capture the character's stats as the baseline.
    pub fn reset(&mut self, character: &Character) {
        self.tally = Tally::seeded();
        self.recent_effects.clear();
        self.active_effects.clear();
        self.conditions.clear();
        self.baseline = character.base_stats();
    }

    /// Apply one result.
    ///
    /// The character is always updated. With `should_tally` the result is
    /// also added to the tally (items, currencies, substats) and counted
    /// against the outstanding conditions.
    pub fn apply_result(&mut self, character: &mut Character, result: &AdventureResult, should_tally: bool) {
        log::debug!("Processing result: {}", result);

        match result.kind {
            ResultKind::Effect => {
                merge_into(&mut self.recent_effects, result);
            }
            ResultKind::Adventures if result.count() < 0 => self.tick_effects(-result.count()),
            kind if kind.is_tallied() && should_tally => self.tally.merge(result),
            _ => {}
        }

        character.apply(result);

        if !should_tally {
            return;
        }

        if result.kind == ResultKind::Substats {
            let now = character.base_stats();
            let gains = [0, 1, 2].map(|i| now[i] - self.baseline[i]);
            self.tally.set_aggregate(gains);
        }

        if result.kind != ResultKind::Adventures && self.conditions.reconcile(result) {
            log::info!("Condition satisfied: {}", result.name);
        }
    }

    /// Move staged effects into the active list.
    ///
    /// Returns true if the number of active effects changed.
    pub fn apply_recent_effects(&mut self) -> bool {
        let before = self.active_effects.len();
        for effect in self.recent_effects.drain(..) {
            merge_into(&mut self.active_effects, &effect);
        }
        self.active_effects.retain(|effect| effect.count() > 0);
        self.active_effects.len() != before
    }

    /// Spend turns off every active effect, dropping the expired ones
    fn tick_effects(&mut self, turns: i64) {
        for effect in self.active_effects.iter_mut() {
            *effect = effect.with_count(effect.count() - turns);
        }
        self.active_effects.retain(|effect| effect.count() > 0);
    }

    pub fn add_condition(&mut self, goal: &AdventureResult) {
        self.conditions.add(goal);
    }

    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    pub fn set_use_disjunction(&mut self, use_disjunction: bool) {
        self.use_disjunction = use_disjunction;
    }

    /// Stop once any single condition is met rather than all of them
    pub fn use_disjunction(&self) -> bool {
        self.use_disjunction
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn active_effects(&self) -> &[AdventureResult] {
        &self.active_effects
    }

    pub fn recent_effects(&self) -> &[AdventureResult] {
        &self.recent_effects
    }

    /// Remaining duration of an active effect, zero when inactive
    pub fn effect_duration(&self, name: &str) -> i64 {
        AdventureResult::effect(name, 0).count_in(&self.active_effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MEAT;

    fn character() -> Character {
        Character {
            name: "Tester".to_string(),
            current_hp: 10,
            maximum_hp: 20,
            substats: [100, 100, 100],
            ..Default::default()
        }
    }

    fn ledger_for(character: &Character) -> StateLedger {
        let mut ledger = StateLedger::new();
        ledger.reset(character);
        ledger
    }

    #[test]
    fn test_reset_seeds_tally() {
        let c = character();
        let ledger = ledger_for(&c);
        assert_eq!(ledger.tally().len(), 3);
        assert!(ledger.conditions().is_empty());
    }

    #[test]
    fn test_tallied_result() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.apply_result(&mut c, &AdventureResult::meat(25), true);
        ledger.apply_result(&mut c, &AdventureResult::item("ketchup", 1), true);
        assert_eq!(ledger.tally().count_of(MEAT, ResultKind::Currency), 25);
        assert_eq!(ledger.tally().count_of("ketchup", ResultKind::Item), 1);
        assert_eq!(c.meat, 25);
        assert!(c.has_item("ketchup"));
    }

    #[test]
    fn test_untallied_result_updates_character_only() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.add_condition(&AdventureResult::item("ketchup", 1));
        ledger.apply_result(&mut c, &AdventureResult::item("ketchup", 1), false);
        assert_eq!(ledger.tally().count_of("ketchup", ResultKind::Item), 0);
        assert!(c.has_item("ketchup"));
        assert_eq!(ledger.conditions().len(), 1);
    }

    #[test]
    fn test_health_is_not_tallied() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.apply_result(&mut c, &AdventureResult::health(-4), true);
        assert_eq!(c.current_hp, 6);
        assert_eq!(ledger.tally().len(), 3);
    }

    #[test]
    fn test_substats_recompute_aggregate() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.apply_result(&mut c, &AdventureResult::substats([21, 0, 0]), true);
        assert_eq!(ledger.tally().aggregate(), [1, 0, 0]);
        ledger.apply_result(&mut c, &AdventureResult::substats([23, 44, 0]), true);
        assert_eq!(ledger.tally().aggregate(), [2, 2, 0]);
        assert_eq!(ledger.tally().len(), 3);
    }

    #[test]
    fn test_effects_staged_until_boundary() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.apply_result(&mut c, &AdventureResult::effect("Gristlesphere", 10), true);
        assert!(ledger.active_effects().is_empty());
        assert_eq!(ledger.recent_effects().len(), 1);

        assert!(ledger.apply_recent_effects());
        assert_eq!(ledger.effect_duration("Gristlesphere"), 10);
        assert!(ledger.recent_effects().is_empty());

        ledger.apply_result(&mut c, &AdventureResult::effect("Gristlesphere", 5), true);
        assert!(!ledger.apply_recent_effects());
        assert_eq!(ledger.effect_duration("Gristlesphere"), 15);
    }

    #[test]
    fn test_adventures_tick_effects() {
        let mut c = character();
        c.adventures_left = 10;
        let mut ledger = ledger_for(&c);
        ledger.apply_result(&mut c, &AdventureResult::effect("Short", 1), true);
        ledger.apply_result(&mut c, &AdventureResult::effect("Long", 5), true);
        ledger.apply_recent_effects();

        ledger.apply_result(&mut c, &AdventureResult::adventures(-1), true);
        assert_eq!(ledger.effect_duration("Short"), 0);
        assert_eq!(ledger.effect_duration("Long"), 4);
        assert_eq!(ledger.active_effects().len(), 1);
        assert_eq!(c.adventures_left, 9);
    }

    #[test]
    fn test_adventures_do_not_reconcile_conditions() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.add_condition(&AdventureResult::adventures(1));
        ledger.apply_result(&mut c, &AdventureResult::adventures(5), true);
        assert_eq!(ledger.conditions().len(), 1);
    }

    #[test]
    fn test_effect_condition() {
        let mut c = character();
        let mut ledger = ledger_for(&c);
        ledger.add_condition(&AdventureResult::effect("Gristlesphere", 1));
        ledger.apply_result(&mut c, &AdventureResult::effect("Gristlesphere", 10), true);
        assert!(ledger.conditions().is_empty());
    }
}
