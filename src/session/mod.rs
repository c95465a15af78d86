//! Session context
//!
//! One `Session` exists per login. It owns the character, the ledger and
//! every per-session cache; the executor borrows it mutably for the length
//! of a run.

pub mod registry;

pub use registry::{EncounterLog, PlayerRegistry, RegisteredEncounter};

use chrono::{Local, NaiveDate};
use std::collections::HashMap;

use crate::domain::{AdventureResult, Character, MEAT, ResultKind};
use crate::ledger::StateLedger;
use crate::parser::{BlockParse, parse_block};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub character: Character,
    pub ledger: StateLedger,
    pub log: EncounterLog,
    pub players: PlayerRegistry,
    permits_continue: bool,
    /// Last parsed balance per merchant; absent means unknown
    balances: HashMap<String, i64>,
    restore_uses: HashMap<String, u32>,
    restore_day: Option<NaiveDate>,
}

impl Session {
    /// Log in: reset every per-session structure and capture stat baselines.
    pub fn login(id: &str, character: Character) -> Self {
        let mut session = Self {
            character,
            permits_continue: true,
            ..Default::default()
        };
        session.ledger.reset(&session.character);
        let name = session.character.name.clone();
        session.players.register(&name, id);
        log::info!("Session started for {}", name);
        session
    }

    /// Log out: drop the ledger, caches and registries.
    pub fn logout(&mut self) {
        log::info!("Session ended for {}", self.character.name);
        self.ledger = StateLedger::new();
        self.log.clear();
        self.players.clear();
        self.balances.clear();
        self.restore_uses.clear();
        self.restore_day = None;
        self.permits_continue = false;
    }

    pub fn permits_continue(&self) -> bool {
        self.permits_continue
    }

    /// Ask any running loop to stop at its next boundary
    pub fn cancel(&mut self) {
        self.permits_continue = false;
    }

    pub fn reset_continue(&mut self) {
        self.permits_continue = true;
    }

    /// Apply one result to the ledger and tally it.
    pub fn process_result(&mut self, result: &AdventureResult) {
        self.ledger.apply_result(&mut self.character, result, true);
    }

    /// Parse a response and apply everything it reported.
    ///
    /// Returns true if the response reported any result at all.
    pub fn process_response(&mut self, text: &str) -> bool {
        let BlockParse {
            results,
            had_results,
            familiar_gained,
        } = parse_block(text);

        for result in &results {
            self.process_result(result);
        }
        if familiar_gained {
            self.character.familiar_weight += 1;
        }
        had_results
    }

    /// Items, effects and Meat still missing from `requirements`.
    ///
    /// Each entry carries the shortfall, not the requested count.
    pub fn check_requirements(&self, requirements: &[AdventureResult]) -> Vec<AdventureResult> {
        let missing: Vec<AdventureResult> = requirements
            .iter()
            .filter_map(|required| {
                let have = match required.kind {
                    ResultKind::Item => self.character.item_count(&required.name),
                    ResultKind::Effect => self.ledger.effect_duration(&required.name),
                    ResultKind::Currency if required.name == MEAT => self.character.meat,
                    _ => return None,
                };
                let short = required.count() - have;
                (short > 0).then(|| required.with_count(short))
            })
            .collect();

        if missing.is_empty() {
            log::info!("Requirements met.");
        } else {
            log::warn!("Insufficient items to continue: {} missing", missing.len());
        }
        missing
    }

    pub fn balance(&self, merchant: &str) -> Option<i64> {
        self.balances.get(merchant).copied()
    }

    /// Cache a parsed balance; `None` forgets it
    pub fn set_balance(&mut self, merchant: &str, balance: Option<i64>) {
        match balance {
            Some(value) => {
                self.balances.insert(merchant.to_string(), value);
            }
            None => {
                self.balances.remove(merchant);
            }
        }
    }

    /// Daily-capped restore uses consumed on `day`
    pub fn restore_uses_on(&mut self, source: &str, day: NaiveDate) -> u32 {
        self.roll_restore_day(day);
        self.restore_uses.get(source).copied().unwrap_or(0)
    }

    pub fn record_restore_use_on(&mut self, source: &str, day: NaiveDate) {
        self.roll_restore_day(day);
        *self.restore_uses.entry(source.to_string()).or_insert(0) += 1;
    }

    pub fn restore_uses_today(&mut self, source: &str) -> u32 {
        self.restore_uses_on(source, Local::now().date_naive())
    }

    pub fn record_restore_use(&mut self, source: &str) {
        self.record_restore_use_on(source, Local::now().date_naive());
    }

    fn roll_restore_day(&mut self, day: NaiveDate) {
        if self.restore_day != Some(day) {
            self.restore_uses.clear();
            self.restore_day = Some(day);
        }
    }
}
