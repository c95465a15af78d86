//! Outstanding goals
//!
//! Conditions are decremented as matching results arrive and removed once
//! satisfied. No count ever goes negative.

use serde::Serialize;

use crate::domain::{AdventureResult, Quantity, merge_into};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conditions {
    goals: Vec<AdventureResult>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a goal; repeated goals for one entity accumulate
    pub fn add(&mut self, goal: &AdventureResult) {
        let index = merge_into(&mut self.goals, goal);
        if is_met(&self.goals[index]) {
            self.goals.remove(index);
        }
    }

    /// Count a result against its goal.
    ///
    /// Returns true if the goal was satisfied and removed.
    pub fn reconcile(&mut self, result: &AdventureResult) -> bool {
        let Some(index) = self.goals.iter().position(|g| g.same_entity(result)) else {
            return false;
        };
        let goal = &self.goals[index];

        if goal.kind.is_vector() {
            let wanted = goal.vector();
            let got = result.vector();
            let remaining = [0, 1, 2].map(|i| (wanted[i] - got[i]).max(0));
            if remaining == [0, 0, 0] {
                self.goals.remove(index);
                return true;
            }
            self.goals[index] = AdventureResult {
                name: goal.name.clone(),
                kind: goal.kind,
                quantity: Quantity::Vector(remaining),
            };
            return false;
        }

        if goal.count() <= result.count() {
            self.goals.remove(index);
            true
        } else {
            self.goals[index] = goal.merged(&result.negated());
            false
        }
    }

    pub fn clear(&mut self) {
        self.goals.clear();
    }

    pub fn goals(&self) -> &[AdventureResult] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

fn is_met(goal: &AdventureResult) -> bool {
    if goal.kind.is_vector() {
        goal.vector().iter().all(|c| *c <= 0)
    } else {
        goal.count() <= 0
    }
}
