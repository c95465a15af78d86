//! Session tally
//!
//! Ordered running totals of items, currencies and stat gains. The first
//! three slots are seeded at reset; the aggregate slot is overwritten in
//! place rather than merged.

use serde::Serialize;

use crate::domain::{AdventureResult, ResultKind, merge_into};

/// Fixed position of the derived stat-gain aggregate.
pub const AGGREGATE_SLOT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    entries: Vec<AdventureResult>,
}

impl Default for Tally {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Tally {
    /// Fresh tally: Meat 0, substats [0,0,0], aggregate [0,0,0]
    pub fn seeded() -> Self {
        Self {
            entries: vec![
                AdventureResult::meat(0),
                AdventureResult::substats([0, 0, 0]),
                AdventureResult::aggregate([0, 0, 0]),
            ],
        }
    }

    /// Add a result; aggregates replace the fixed slot
    pub fn merge(&mut self, result: &AdventureResult) {
        if result.kind == ResultKind::Aggregate {
            self.set_aggregate(result.vector());
        } else {
            merge_into(&mut self.entries, result);
        }
    }

    pub fn set_aggregate(&mut self, gains: [i64; 3]) {
        let aggregate = AdventureResult::aggregate(gains);
        if self.entries.len() > AGGREGATE_SLOT {
            self.entries[AGGREGATE_SLOT] = aggregate;
        } else {
            self.entries.push(aggregate);
        }
    }

    pub fn aggregate(&self) -> [i64; 3] {
        self.entries
            .get(AGGREGATE_SLOT)
            .map(AdventureResult::vector)
            .unwrap_or_default()
    }

    /// Total for an entity, zero when it was never tallied
    pub fn count_of(&self, name: &str, kind: ResultKind) -> i64 {
        AdventureResult::new(name, kind, 0).count_in(&self.entries)
    }

    pub fn entries(&self) -> &[AdventureResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
