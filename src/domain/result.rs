//! Typed result deltas
//!
//! An AdventureResult is a named quantity change: items gained or lost,
//! effects and their durations, meat, stat subpoints, and the character
//! levels the game reports in free text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the game's primary currency.
pub const MEAT: &str = "Meat";
/// Name of the health result.
pub const HP: &str = "HP";
/// Name of the mana result.
pub const MP: &str = "MP";
/// Name of the adventure-count result.
pub const ADV: &str = "Adv";
/// Name of the inebriety result.
pub const DRUNK: &str = "Drunk";
/// Name of the stat subpoint vector.
pub const SUBSTATS: &str = "Substats";
/// Name of the derived full-stat aggregate.
pub const FULLSTATS: &str = "Fullstats";

/// What a result measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Item,
    Effect,
    Substats,
    Currency,
    Adventures,
    Health,
    Mana,
    Inebriety,
    /// Derived stat gain since session start; overwritten, never merged
    Aggregate,
}

impl ResultKind {
    /// Returns true if the kind carries a (muscle, mysticality, moxie) vector
    pub fn is_vector(self) -> bool {
        matches!(self, ResultKind::Substats | ResultKind::Aggregate)
    }

    /// Returns true if results of this kind are added to the session tally
    pub fn is_tallied(self) -> bool {
        matches!(
            self,
            ResultKind::Item | ResultKind::Currency | ResultKind::Substats
        )
    }
}

/// A scalar count or a three-component stat vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Scalar(i64),
    Vector([i64; 3]),
}

impl Quantity {
    fn add(self, other: Quantity) -> Quantity {
        match (self, other) {
            (Quantity::Vector(a), Quantity::Vector(b)) => {
                Quantity::Vector([
                    a[0].saturating_add(b[0]),
                    a[1].saturating_add(b[1]),
                    a[2].saturating_add(b[2]),
                ])
            }
            (Quantity::Vector(a), Quantity::Scalar(s)) | (Quantity::Scalar(s), Quantity::Vector(a)) => {
                Quantity::Vector([a[0].saturating_add(s), a[1], a[2]])
            }
            (Quantity::Scalar(a), Quantity::Scalar(b)) => Quantity::Scalar(a.saturating_add(b)),
        }
    }

    fn scale(self, factor: i64) -> Quantity {
        match self {
            Quantity::Scalar(n) => Quantity::Scalar(n.saturating_mul(factor)),
            Quantity::Vector(v) => Quantity::Vector(v.map(|n| n.saturating_mul(factor))),
        }
    }

    fn checked_scale(self, factor: i64) -> Option<Quantity> {
        match self {
            Quantity::Scalar(n) => n.checked_mul(factor).map(Quantity::Scalar),
            Quantity::Vector(v) => Some(Quantity::Vector([
                v[0].checked_mul(factor)?,
                v[1].checked_mul(factor)?,
                v[2].checked_mul(factor)?,
            ])),
        }
    }
}

/// A named, typed quantity delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureResult {
    pub name: String,
    pub kind: ResultKind,
    pub quantity: Quantity,
}

impl AdventureResult {
    /// Create a scalar result of any kind
    pub fn new(name: impl Into<String>, kind: ResultKind, count: i64) -> Self {
        let quantity = if kind.is_vector() {
            Quantity::Vector([count, 0, 0])
        } else {
            Quantity::Scalar(count)
        };
        Self {
            name: name.into(),
            kind,
            quantity,
        }
    }

    pub fn item(name: impl Into<String>, count: i64) -> Self {
        Self::new(name, ResultKind::Item, count)
    }

    pub fn effect(name: impl Into<String>, duration: i64) -> Self {
        Self::new(name, ResultKind::Effect, duration)
    }

    pub fn currency(name: impl Into<String>, count: i64) -> Self {
        Self::new(name, ResultKind::Currency, count)
    }

    pub fn meat(count: i64) -> Self {
        Self::currency(MEAT, count)
    }

    pub fn health(count: i64) -> Self {
        Self::new(HP, ResultKind::Health, count)
    }

    pub fn mana(count: i64) -> Self {
        Self::new(MP, ResultKind::Mana, count)
    }

    pub fn adventures(count: i64) -> Self {
        Self::new(ADV, ResultKind::Adventures, count)
    }

    pub fn inebriety(count: i64) -> Self {
        Self::new(DRUNK, ResultKind::Inebriety, count)
    }

    pub fn substats(gains: [i64; 3]) -> Self {
        Self {
            name: SUBSTATS.to_string(),
            kind: ResultKind::Substats,
            quantity: Quantity::Vector(gains),
        }
    }

    pub fn aggregate(gains: [i64; 3]) -> Self {
        Self {
            name: FULLSTATS.to_string(),
            kind: ResultKind::Aggregate,
            quantity: Quantity::Vector(gains),
        }
    }

    /// Two results describe the same entity iff name and kind match
    pub fn same_entity(&self, other: &AdventureResult) -> bool {
        self.kind == other.kind && self.name == other.name
    }

    /// Scalar count; vectors report the sum of their components
    pub fn count(&self) -> i64 {
        match self.quantity {
            Quantity::Scalar(n) => n,
            Quantity::Vector(v) => v.iter().fold(0i64, |total, n| total.saturating_add(*n)),
        }
    }

    /// Vector view; scalars occupy the first component
    pub fn vector(&self) -> [i64; 3] {
        match self.quantity {
            Quantity::Scalar(n) => [n, 0, 0],
            Quantity::Vector(v) => v,
        }
    }

    /// Same entity with a different count
    pub fn with_count(&self, count: i64) -> Self {
        Self::new(self.name.clone(), self.kind, count)
    }

    /// Same entity with the count multiplied by `factor`
    pub fn scaled(&self, factor: i64) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            quantity: self.quantity.scale(factor),
        }
    }

    /// Like `scaled`, but `None` when any component overflows
    pub fn checked_scaled(&self, factor: i64) -> Option<Self> {
        Some(Self {
            name: self.name.clone(),
            kind: self.kind,
            quantity: self.quantity.checked_scale(factor)?,
        })
    }

    pub fn negated(&self) -> Self {
        self.scaled(-1)
    }

    /// Additive merge of two results for the same entity
    pub fn merged(&self, other: &AdventureResult) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            quantity: self.quantity.add(other.quantity),
        }
    }

    /// Count of this entity in `list`, zero when absent
    pub fn count_in(&self, list: &[AdventureResult]) -> i64 {
        list.iter()
            .find(|r| r.same_entity(self))
            .map(|r| r.count())
            .unwrap_or(0)
    }
}

impl fmt::Display for AdventureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantity {
            Quantity::Vector(v) => write!(f, "{}: {} / {} / {}", self.name, v[0], v[1], v[2]),
            Quantity::Scalar(n) => match self.kind {
                ResultKind::Currency | ResultKind::Health | ResultKind::Mana | ResultKind::Adventures => {
                    write!(f, "{}: {}", self.name, n)
                }
                _ => write!(f, "{} ({})", self.name, n),
            },
        }
    }
}

/// Merge `result` into `list`, preserving insertion order.
///
/// Returns the index of the merged entry.
pub fn merge_into(list: &mut Vec<AdventureResult>, result: &AdventureResult) -> usize {
    match list.iter().position(|r| r.same_entity(result)) {
        Some(index) => {
            list[index] = list[index].merged(result);
            index
        }
        None => {
            list.push(result.clone());
            list.len() - 1
        }
    }
}
