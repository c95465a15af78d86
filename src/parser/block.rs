//! Whole-response parsing
//!
//! Responses are markup; results are spread across tokens once the tags are
//! stripped ("You acquire an item:" in one token, the bolded item name in
//! the next).

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::rules::{
    ACQUIRE_PREFIX, GAIN_PREFIX, LOSS_PREFIX, LineMatch, acquired_item, classify_line, parse_count,
    split_counted_name,
};
use crate::domain::AdventureResult;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());
static INCOMING_DAMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"you for ([\d,]+) damage").unwrap());
static REFLECTED_DAMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"You drop .*? ([\d,]+) damage").unwrap());

const FAMILIAR_WEIGHT_MARKER: &str = "gains a pound!</b>";

/// Width of "(duration: " and of " Adventures)" minus its leading space.
const DURATION_WRAPPER_WIDTH: usize = 11;

/// Everything recognised in one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockParse {
    pub results: Vec<AdventureResult>,
    /// True when any acquisition, gain or loss was seen, parsed or not
    pub had_results: bool,
    /// The familiar put on weight
    pub familiar_gained: bool,
}

/// Parse a full response into results.
pub fn parse_block(text: &str) -> BlockParse {
    let mut parse = BlockParse::default();

    if text.contains(FAMILIAR_WEIGHT_MARKER) {
        parse.familiar_gained = true;
        parse.had_results = true;
    }

    let plain = MARKUP_RE.replace_all(text, "\n");

    for damage_re in [&*INCOMING_DAMAGE_RE, &*REFLECTED_DAMAGE_RE] {
        for caps in damage_re.captures_iter(&plain) {
            parse.had_results = true;
            if let Some(amount) = parse_count(&caps[1]) {
                parse.results.push(AdventureResult::health(-amount));
            }
        }
    }

    let tokens: Vec<&str> = plain
        .split('\n')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        if token.starts_with(ACQUIRE_PREFIX) {
            parse.had_results = true;
            let (result, consumed) = acquisition(&tokens, i);
            parse.results.extend(result);
            i += 1 + consumed;
            continue;
        }

        if token.starts_with(GAIN_PREFIX) || token.starts_with(LOSS_PREFIX) {
            parse.had_results = true;
            if let LineMatch::Parsed(result) = classify_line(token) {
                parse.results.push(result);
            }
        }

        i += 1;
    }

    parse
}

/// Resolve an acquisition at `tokens[i]`; returns the result and how many
/// following tokens it consumed.
fn acquisition(tokens: &[&str], i: usize) -> (Option<AdventureResult>, usize) {
    let token = tokens[i];

    // Inline form: everything on one line
    if let LineMatch::Parsed(result) = classify_line(token) {
        return (Some(result), 0);
    }

    let Some(subject) = tokens.get(i + 1) else {
        return (None, 0);
    };

    if token.contains("effect") {
        let duration_token = tokens.get(i + 2).filter(|t| t.contains("duration"));
        let duration = duration_token.and_then(|t| wrapped_duration(t)).unwrap_or(1);
        let consumed = if duration_token.is_some() { 2 } else { 1 };
        return (Some(AdventureResult::effect(subject.trim(), duration)), consumed);
    }

    let result = if token.contains("an item") {
        split_counted_name(subject).map(|(name, count)| AdventureResult::item(name, count))
    } else {
        acquired_item(subject)
    };
    (result, 1)
}

/// Pull N out of "(duration: N Adventures)" by position.
fn wrapped_duration(token: &str) -> Option<i64> {
    let end = token.len().checked_sub(DURATION_WRAPPER_WIDTH)?;
    let inner = token.get(DURATION_WRAPPER_WIDTH..end)?;
    parse_count(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultKind;

    #[test]
    fn test_item_with_an_item_phrase() {
        let parse = parse_block("<td>You acquire an item: <b>seal-clubbing club</b></td>");
        assert!(parse.had_results);
        assert_eq!(parse.results, vec![AdventureResult::item("seal-clubbing club", 1)]);
    }

    #[test]
    fn test_item_with_explicit_count() {
        let parse = parse_block("<td>You acquire <b>1,200 ketchup</b></td>");
        assert_eq!(parse.results, vec![AdventureResult::item("ketchup", 1200)]);
    }

    #[test]
    fn test_item_without_count_defaults_to_one() {
        let parse = parse_block("<td>You acquire <b>sweet rims</b></td>");
        assert_eq!(parse.results, vec![AdventureResult::item("sweet rims", 1)]);
    }

    #[test]
    fn test_effect_with_duration() {
        let parse = parse_block(
            "<td>You acquire an effect: <b>Gristlesphere</b><br>(duration: 10 Adventures)</td>",
        );
        assert_eq!(parse.results, vec![AdventureResult::effect("Gristlesphere", 10)]);
    }

    #[test]
    fn test_effect_without_duration_keeps_next_line() {
        let parse = parse_block(
            "<td>You acquire an effect: <b>Gristlesphere</b></td><td>You gain 5 Meat.</td>",
        );
        assert_eq!(
            parse.results,
            vec![AdventureResult::effect("Gristlesphere", 1), AdventureResult::meat(5)]
        );
    }

    #[test]
    fn test_gain_and_loss_lines() {
        let parse = parse_block(
            "<p>You gain 12 Strongness.</p><p>You lose 3 hit points.</p><p>You gain 1,000 Meat.</p>",
        );
        assert_eq!(
            parse.results,
            vec![
                AdventureResult::substats([12, 0, 0]),
                AdventureResult::health(-3),
                AdventureResult::meat(1000),
            ]
        );
    }

    #[test]
    fn test_damage_phrasings() {
        let text = "The goblin hits you for 4 damage. \
                    It bites you for 1,002 damage. \
                    You drop your guard and take 7 damage.";
        let parse = parse_block(text);
        let damage: Vec<i64> = parse
            .results
            .iter()
            .filter(|r| r.kind == ResultKind::Health)
            .map(|r| r.count())
            .collect();
        assert_eq!(damage, vec![-4, -1002, -7]);
        assert!(parse.had_results);
    }

    #[test]
    fn test_vague_gain_still_had_results() {
        let parse = parse_block("<td>You gain a Level!</td>");
        assert!(parse.had_results);
        assert!(parse.results.is_empty());
    }

    #[test]
    fn test_lookalike_lines_are_not_results() {
        let parse = parse_block("<p>You loser.</p><p>You gained nothing.</p>");
        assert!(!parse.had_results);
        assert!(parse.results.is_empty());
    }

    #[test]
    fn test_nothing_happened() {
        let parse = parse_block("<html><body>The hermit looks at you.</body></html>");
        assert!(!parse.had_results);
        assert!(parse.results.is_empty());
    }

    #[test]
    fn test_familiar_weight_marker() {
        let parse = parse_block("<b>Mr. Pants gains a pound!</b>");
        assert!(parse.familiar_gained);
        assert!(parse.had_results);
    }

    #[test]
    fn test_dangling_acquire() {
        let parse = parse_block("You acquire an item:");
        assert!(parse.had_results);
        assert!(parse.results.is_empty());
    }

    #[test]
    fn test_wrapped_duration() {
        assert_eq!(wrapped_duration("(duration: 10 Adventures)"), Some(10));
        assert_eq!(wrapped_duration("(duration: 1 Adventure)"), Some(1));
        assert_eq!(wrapped_duration("(duration)"), None);
    }
}
