//! Per-session registries
//!
//! Adventure and encounter summaries plus the player name/id tracker.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A named entry with the number of times it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredEncounter {
    pub name: String,
    pub count: u32,
}

impl RegisteredEncounter {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
        }
    }
}

impl fmt::Display for RegisteredEncounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.count)
    }
}

/// Where the session went and what it met there.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EncounterLog {
    adventures: Vec<RegisteredEncounter>,
    encounters: Vec<RegisteredEncounter>,
}

impl EncounterLog {
    /// Record a visit; consecutive visits to one location share an entry
    pub fn register_adventure(&mut self, location: &str) {
        match self.adventures.last_mut() {
            Some(last) if last.name == location => last.count += 1,
            _ => self.adventures.push(RegisteredEncounter::new(location)),
        }
    }

    /// Record an encounter by case-insensitive name
    pub fn register_encounter(&mut self, name: &str) {
        let name = name.trim().to_lowercase();
        match self.encounters.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.count += 1,
            None => self.encounters.push(RegisteredEncounter::new(name)),
        }
    }

    pub fn adventures(&self) -> &[RegisteredEncounter] {
        &self.adventures
    }

    pub fn encounters(&self) -> &[RegisteredEncounter] {
        &self.encounters
    }

    pub fn clear(&mut self) {
        self.adventures.clear();
        self.encounters.clear();
    }
}

/// Player names seen this session and their ids.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    ids_by_name: HashMap<String, String>,
    names_by_id: HashMap<String, String>,
}

impl PlayerRegistry {
    /// First registration of a name wins
    pub fn register(&mut self, name: &str, id: &str) {
        let key = name.to_lowercase();
        if self.ids_by_name.contains_key(&key) {
            return;
        }
        self.ids_by_name.insert(key, id.to_string());
        self.names_by_id.insert(id.to_string(), name.to_string());
    }

    /// Known id for a name, else the name with spaces as underscores
    pub fn player_id(&self, name: &str) -> String {
        self.ids_by_name
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| name.replace(' ', "_"))
    }

    pub fn player_name(&self, id: &str) -> Option<&str> {
        self.names_by_id.get(id).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.ids_by_name.clear();
        self.names_by_id.clear();
    }
}
