//! Actions the executor can repeat
//!
//! An action knows how to build its request and how to fold the response
//! back into the session. The executor only needs its class to decide on
//! recovery and the impairment check.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{AdventureResult, Request, Response};
use crate::error::Result;
use crate::session::Session;

static MONSTER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span id=['"]monname['"]>(?:an? |the )?([^<]+)</span>"#).unwrap());
static ENCOUNTER_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>([^<]+)</b></td></tr>").unwrap());

/// What kind of request an action makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionClass {
    /// Spends a turn in a zone
    Adventure { zone: String },
    /// Casts a skill costing MP
    Skill { mp_cost: i64 },
    /// Buys from a merchant
    Purchase,
    Other,
}

/// A repeatable request.
pub trait Action: Send + Sync {
    /// Short label used in progress messages
    fn describe(&self) -> String;

    fn request(&self) -> Request;

    fn class(&self) -> ActionClass {
        ActionClass::Other
    }

    /// Adventures charged per successful pass
    fn adventures_used(&self) -> i64 {
        0
    }

    /// Fold the response into the session; returns whether anything changed.
    fn reconcile(&self, response: &Response, session: &mut Session) -> Result<bool> {
        Ok(session.process_response(&response.text))
    }
}

/// Action built from a request and a label.
#[derive(Debug, Clone)]
pub struct GenericAction {
    label: String,
    request: Request,
    class: ActionClass,
    adventures_used: i64,
}

impl GenericAction {
    pub fn new(label: impl Into<String>, request: Request) -> Self {
        Self {
            label: label.into(),
            request,
            class: ActionClass::Other,
            adventures_used: 0,
        }
    }

    pub fn with_class(mut self, class: ActionClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_adventures(mut self, adventures: i64) -> Self {
        self.adventures_used = adventures;
        self
    }
}

impl Action for GenericAction {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn request(&self) -> Request {
        self.request.clone()
    }

    fn class(&self) -> ActionClass {
        self.class.clone()
    }

    fn adventures_used(&self) -> i64 {
        self.adventures_used
    }
}

/// One turn spent in a zone.
#[derive(Debug, Clone)]
pub struct Adventure {
    zone: String,
    snarfblat: u32,
}

impl Adventure {
    pub fn new(zone: impl Into<String>, snarfblat: u32) -> Self {
        Self {
            zone: zone.into(),
            snarfblat,
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }
}

impl Action for Adventure {
    fn describe(&self) -> String {
        self.zone.clone()
    }

    fn request(&self) -> Request {
        Request::new("adventure.php").field("snarfblat", self.snarfblat.to_string())
    }

    fn class(&self) -> ActionClass {
        ActionClass::Adventure {
            zone: self.zone.clone(),
        }
    }

    fn adventures_used(&self) -> i64 {
        1
    }

    fn reconcile(&self, response: &Response, session: &mut Session) -> Result<bool> {
        session.log.register_adventure(&self.zone);
        if let Some(name) = encounter_name(&response.text) {
            session.log.register_encounter(&name);
        }
        Ok(session.process_response(&response.text))
    }
}

fn encounter_name(text: &str) -> Option<String> {
    MONSTER_NAME_RE
        .captures(text)
        .or_else(|| ENCOUNTER_TITLE_RE.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

/// A skill cast; its MP cost is charged on reconcile.
#[derive(Debug, Clone)]
pub struct SkillCast {
    name: String,
    skill_id: u32,
    mp_cost: i64,
}

impl SkillCast {
    pub fn new(name: impl Into<String>, skill_id: u32, mp_cost: i64) -> Self {
        Self {
            name: name.into(),
            skill_id,
            mp_cost,
        }
    }
}

impl Action for SkillCast {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn request(&self) -> Request {
        Request::new("skills.php")
            .field("action", "Skillz")
            .field("whichskill", self.skill_id.to_string())
    }

    fn class(&self) -> ActionClass {
        ActionClass::Skill { mp_cost: self.mp_cost }
    }

    fn reconcile(&self, response: &Response, session: &mut Session) -> Result<bool> {
        session.process_result(&AdventureResult::mana(-self.mp_cost));
        session.process_response(&response.text);
        Ok(true)
    }
}
