//! Line rules for free-text result parsing
//!
//! Each rule pairs a sentence prefix with the sign it implies and a
//! constructor for the subject that follows it.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::AdventureResult;

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([\d,]+)\s+(.+)$").unwrap());
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(duration:\s*([\d,]+)").unwrap());

/// Quantity words the game uses instead of a number.
const VAGUE_QUANTITIES: &[&str] = &["a", "an", "some"];

const MUSCLE_SUBSTATS: &[&str] = &["beefiness", "fortitude", "muscleboundness", "strengthliness", "strongness"];
const MYSTICALITY_SUBSTATS: &[&str] = &["enchantedness", "magicalness", "mysteriousness", "wizardliness"];
const MOXIE_SUBSTATS: &[&str] = &["cheek", "chutzpah", "roguishness", "sarcasm", "smarm"];

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// A typed result was constructed
    Parsed(AdventureResult),
    /// "You gain a clue": recognised, deliberately produces nothing
    Ambiguous,
    /// Known prefix, subject could not be turned into a result
    Unrecognized,
    /// Not a result line at all
    NoMatch,
}

impl LineMatch {
    /// Returns true if the line reported that something happened
    pub fn is_recognized(&self) -> bool {
        !matches!(self, LineMatch::NoMatch)
    }

    pub fn into_result(self) -> Option<AdventureResult> {
        match self {
            LineMatch::Parsed(result) => Some(result),
            _ => None,
        }
    }
}

struct LineRule {
    prefix: &'static str,
    sign: i64,
    build: fn(&str, i64) -> LineMatch,
}

pub(super) const GAIN_PREFIX: &str = "You gain ";
pub(super) const LOSS_PREFIX: &str = "You lose ";
pub(super) const ACQUIRE_PREFIX: &str = "You acquire";

const RULES: &[LineRule] = &[
    LineRule {
        prefix: GAIN_PREFIX,
        sign: 1,
        build: build_change,
    },
    LineRule {
        prefix: LOSS_PREFIX,
        sign: -1,
        build: build_change,
    },
    LineRule {
        prefix: ACQUIRE_PREFIX,
        sign: 1,
        build: build_acquisition,
    },
];

/// Run a line through the rule table.
pub fn classify_line(text: &str) -> LineMatch {
    let line = text.trim();
    RULES
        .iter()
        .find(|rule| line.starts_with(rule.prefix))
        .map(|rule| (rule.build)(&line[rule.prefix.len()..], rule.sign))
        .unwrap_or(LineMatch::NoMatch)
}

/// Parse an integer that may carry thousands separators.
pub fn parse_count(text: &str) -> Option<i64> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Split "name (3)" into its name and count; the count defaults to 1.
pub fn split_counted_name(text: &str) -> Option<(String, i64)> {
    let text = text.trim();
    match text.find('(') {
        Some(open) => {
            let name = text[..open].trim();
            let inner = text[open + 1..].trim_end_matches(')');
            let count = parse_count(inner)?;
            (!name.is_empty()).then(|| (name.to_string(), count))
        }
        None => (!text.is_empty()).then(|| (text.to_string(), 1)),
    }
}

fn is_vague(word: &str) -> bool {
    VAGUE_QUANTITIES.contains(&word.to_lowercase().as_str())
}

fn build_change(body: &str, sign: i64) -> LineMatch {
    // Sentences run on after the first period ("You gain 5 Meat. Wow!")
    let body = body.split('.').next().unwrap_or("").trim();

    let first_word = body.split_whitespace().next().unwrap_or("");
    if is_vague(first_word) {
        log::debug!("Ignoring non-numeric quantity: {}", body);
        return LineMatch::Ambiguous;
    }

    let Some(caps) = COUNT_RE.captures(body) else {
        return LineMatch::Unrecognized;
    };
    let Some(count) = parse_count(&caps[1]) else {
        return LineMatch::Unrecognized;
    };

    match subject_result(caps[2].trim(), sign * count) {
        Some(result) => LineMatch::Parsed(result),
        None => {
            log::debug!("Unrecognized result subject: {}", &caps[2]);
            LineMatch::Unrecognized
        }
    }
}

fn subject_result(subject: &str, delta: i64) -> Option<AdventureResult> {
    let lower = subject.to_lowercase();

    if lower == "meat" {
        return Some(AdventureResult::meat(delta));
    }
    if lower.starts_with("hit point") {
        return Some(AdventureResult::health(delta));
    }
    if ["mana point", "mojo point", "muscularity point"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return Some(AdventureResult::mana(delta));
    }
    if lower.starts_with("adventure") {
        return Some(AdventureResult::adventures(delta));
    }
    if lower.starts_with("drunkenness") {
        return Some(AdventureResult::inebriety(delta));
    }

    let axis = [MUSCLE_SUBSTATS, MYSTICALITY_SUBSTATS, MOXIE_SUBSTATS]
        .iter()
        .position(|names| names.contains(&lower.as_str()))?;
    let mut gains = [0; 3];
    gains[axis] = delta;
    Some(AdventureResult::substats(gains))
}

fn build_acquisition(body: &str, _sign: i64) -> LineMatch {
    let body = body.trim();

    if let Some(rest) = body.strip_prefix("an item:") {
        return split_counted_name(rest)
            .map(|(name, count)| LineMatch::Parsed(AdventureResult::item(name, count)))
            .unwrap_or(LineMatch::Unrecognized);
    }

    if let Some(rest) = body.strip_prefix("an effect:") {
        let rest = rest.trim();
        let name = rest.split('(').next().unwrap_or("").trim();
        if name.is_empty() {
            return LineMatch::Unrecognized;
        }
        let duration = DURATION_RE
            .captures(rest)
            .and_then(|caps| parse_count(&caps[1]))
            .unwrap_or(1);
        return LineMatch::Parsed(AdventureResult::effect(name, duration));
    }

    match acquired_item(body) {
        Some(result) => LineMatch::Parsed(result),
        None => LineMatch::Unrecognized,
    }
}

/// "3 ketchup" or a bare item name; non-numeric leading words mean one.
pub fn acquired_item(text: &str) -> Option<AdventureResult> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(' ') {
        Some((first, rest)) if parse_count(first).is_some() => {
            let count = parse_count(first)?;
            Some(AdventureResult::item(rest.trim(), count))
        }
        _ => split_counted_name(text).map(|(name, count)| AdventureResult::item(name, count)),
    }
}
