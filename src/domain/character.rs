//! Auxiliary character status
//!
//! Levels, inventory and the state that gates merchant availability. The
//! status-refresh collaborator is the source of truth; results parsed from
//! responses keep it current between refreshes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::result::{AdventureResult, MEAT, ResultKind, merge_into};

/// Zodiac sign family, which unlocks sign-restricted stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignType {
    Muscle,
    Mysticality,
    Moxie,
}

/// Snapshot of the resource levels recovery cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub hp: i64,
    pub mp: i64,
}

/// The logged-in character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub sign: Option<SignType>,
    pub path: Option<String>,
    pub alignment: Option<String>,
    /// Game-mode flags currently in effect
    pub flags: BTreeSet<String>,
    /// Outfit ids the character owns every piece of
    pub outfits: BTreeSet<u32>,

    pub current_hp: i64,
    pub maximum_hp: i64,
    pub current_mp: i64,
    pub maximum_mp: i64,
    pub adventures_left: i64,
    pub inebriety: i64,
    pub meat: i64,
    /// Total subpoints for (muscle, mysticality, moxie)
    pub substats: [i64; 3],
    pub familiar_weight: i64,
    /// Equipped gear restores HP/MP between fights
    pub recovering_equipment: bool,

    pub inventory: Vec<AdventureResult>,
}

impl Character {
    /// Create a character with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Base points for each stat: the floor of the square root of subpoints
    pub fn base_stats(&self) -> [i64; 3] {
        self.substats.map(|s| s.max(0).isqrt())
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            hp: self.current_hp,
            mp: self.current_mp,
        }
    }

    pub fn is_falling_down(&self, inebriety_limit: i64) -> bool {
        self.inebriety > inebriety_limit
    }

    pub fn item_count(&self, name: &str) -> i64 {
        AdventureResult::item(name, 0).count_in(&self.inventory)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.item_count(name) > 0
    }

    pub fn has_outfit(&self, outfit: u32) -> bool {
        self.outfits.contains(&outfit)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Fold a result into the character's levels and inventory.
    ///
    /// Effects are owned by the ledger and ignored here.
    pub fn apply(&mut self, result: &AdventureResult) {
        let count = result.count();
        match result.kind {
            ResultKind::Item => {
                let idx = merge_into(&mut self.inventory, result);
                if self.inventory[idx].count() <= 0 {
                    self.inventory.remove(idx);
                }
            }
            ResultKind::Currency if result.name == MEAT => {
                self.meat = self.meat.saturating_add(count);
            }
            ResultKind::Currency => {}
            ResultKind::Health => {
                self.current_hp = clamp_level(self.current_hp.saturating_add(count), self.maximum_hp);
            }
            ResultKind::Mana => {
                self.current_mp = clamp_level(self.current_mp.saturating_add(count), self.maximum_mp);
            }
            ResultKind::Adventures => {
                self.adventures_left = self.adventures_left.saturating_add(count).max(0);
            }
            ResultKind::Inebriety => self.inebriety = self.inebriety.saturating_add(count).max(0),
            ResultKind::Substats => {
                let gains = result.vector();
                for (total, gain) in self.substats.iter_mut().zip(gains) {
                    *total = total.saturating_add(gain).max(0);
                }
            }
            ResultKind::Effect | ResultKind::Aggregate => {}
        }
    }
}

fn clamp_level(value: i64, maximum: i64) -> i64 {
    if maximum > 0 {
        value.clamp(0, maximum)
    } else {
        value.max(0)
    }
}
