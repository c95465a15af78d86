//! Availability gates
//!
//! A merchant or one of its items can be listed yet unavailable to the
//! current character. Each gate is a pure predicate over `Character`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Character, SignType};

/// A class that gets in anyway once it reaches a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAtLevel {
    pub class: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gate {
    /// Restricted to the listed classes
    Class {
        allowed: Vec<String>,
        #[serde(default)]
        or_class_at_level: Option<ClassAtLevel>,
    },
    /// Requires a zodiac sign family
    Sign { sign: SignType },
    /// Requires owning every piece of an outfit
    Outfit { id: u32 },
    /// Requires a side in a faction conflict
    Alignment { alignment: String },
    /// Requires the current challenge path
    Path { path: String },
    /// Requires a game-mode flag to be set, or clear when `present` is false
    Flag {
        flag: String,
        #[serde(default = "default_present")]
        present: bool,
    },
}

fn default_present() -> bool {
    true
}

impl Gate {
    /// Returns true if the character passes this gate
    pub fn admits(&self, character: &Character) -> bool {
        match self {
            Gate::Class {
                allowed,
                or_class_at_level,
            } => {
                allowed.iter().any(|c| c.eq_ignore_ascii_case(&character.class))
                    || or_class_at_level.as_ref().is_some_and(|escape| {
                        escape.class.eq_ignore_ascii_case(&character.class) && character.level >= escape.level
                    })
            }
            Gate::Sign { sign } => character.sign == Some(*sign),
            Gate::Outfit { id } => character.has_outfit(*id),
            Gate::Alignment { alignment } => character
                .alignment
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(alignment)),
            Gate::Path { path } => character
                .path
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(path)),
            Gate::Flag { flag, present } => character.has_flag(flag) == *present,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Class {
                allowed,
                or_class_at_level: None,
            } => write!(f, "class is one of {}", allowed.join(", ")),
            Gate::Class {
                allowed,
                or_class_at_level: Some(escape),
            } => write!(
                f,
                "class is one of {}, or {} at level {}",
                allowed.join(", "),
                escape.class,
                escape.level
            ),
            Gate::Sign { sign } => write!(f, "{:?} sign", sign),
            Gate::Outfit { id } => write!(f, "outfit #{}", id),
            Gate::Alignment { alignment } => write!(f, "aligned with the {}", alignment),
            Gate::Path { path } => write!(f, "on the {} path", path),
            Gate::Flag { flag, present: true } => write!(f, "{} is active", flag),
            Gate::Flag { flag, present: false } => write!(f, "{} is not active", flag),
        }
    }
}

/// First gate the character fails, if any
pub fn first_failure<'a>(gates: &'a [Gate], character: &Character) -> Option<&'a Gate> {
    gates.iter().find(|gate| !gate.admits(character))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(class: &str, level: u32) -> Character {
        Character {
            name: "Tester".to_string(),
            class: class.to_string(),
            level,
            ..Default::default()
        }
    }

    fn guild_gate() -> Gate {
        Gate::Class {
            allowed: vec!["Pastamancer".to_string(), "Sauceror".to_string()],
            or_class_at_level: Some(ClassAtLevel {
                class: "Accordion Thief".to_string(),
                level: 9,
            }),
        }
    }

    #[test]
    fn test_class_gate_with_level_escape() {
        let gate = guild_gate();
        assert!(gate.admits(&character("Sauceror", 1)));
        assert!(gate.admits(&character("pastamancer", 1)));
        assert!(!gate.admits(&character("Accordion Thief", 8)));
        assert!(gate.admits(&character("Accordion Thief", 9)));
        assert!(!gate.admits(&character("Seal Clubber", 30)));
    }

    #[test]
    fn test_sign_and_outfit_gates() {
        let mut c = character("Seal Clubber", 5);
        let sign = Gate::Sign { sign: SignType::Muscle };
        let outfit = Gate::Outfit { id: 5 };
        assert!(!sign.admits(&c));
        assert!(!outfit.admits(&c));

        c.sign = Some(SignType::Muscle);
        c.outfits.insert(5);
        assert!(sign.admits(&c));
        assert!(outfit.admits(&c));
    }

    #[test]
    fn test_alignment_and_path_gates() {
        let mut c = character("Turtle Tamer", 5);
        let alignment = Gate::Alignment {
            alignment: "hippy".to_string(),
        };
        let path = Gate::Path {
            path: "Kingdom of Exploathing".to_string(),
        };
        assert!(!alignment.admits(&c));
        assert!(!path.admits(&c));

        c.alignment = Some("Hippy".to_string());
        c.path = Some("Kingdom of Exploathing".to_string());
        assert!(alignment.admits(&c));
        assert!(path.admits(&c));
    }

    #[test]
    fn test_flag_gate_presence() {
        let mut c = character("Disco Bandit", 5);
        let needs = Gate::Flag {
            flag: "island war".to_string(),
            present: true,
        };
        let forbids = Gate::Flag {
            flag: "island war".to_string(),
            present: false,
        };
        assert!(!needs.admits(&c));
        assert!(forbids.admits(&c));

        c.flags.insert("island war".to_string());
        assert!(needs.admits(&c));
        assert!(!forbids.admits(&c));
    }

    #[test]
    fn test_first_failure() {
        let c = character("Sauceror", 3);
        let gates = vec![guild_gate(), Gate::Outfit { id: 2 }];
        assert_eq!(first_failure(&gates, &c), Some(&Gate::Outfit { id: 2 }));
        assert_eq!(first_failure(&gates[..1], &c), None);
    }

    #[test]
    fn test_gate_yaml() {
        let yaml = r#"
- kind: class
  allowed: [Disco Bandit, Accordion Thief]
- kind: sign
  sign: mysticality
- kind: flag
  flag: island war
"#;
        let gates: Vec<Gate> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(gates.len(), 3);
        assert_eq!(
            gates[2],
            Gate::Flag {
                flag: "island war".to_string(),
                present: true
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Gate::Outfit { id: 1 }.to_string(), "outfit #1");
        assert_eq!(
            guild_gate().to_string(),
            "class is one of Pastamancer, Sauceror, or Accordion Thief at level 9"
        );
    }
}
