//! Result parsing
//!
//! Turns the game's free-text narration into typed `AdventureResult`s:
//! - rules: single-line classification ("You gain 5 Meat.")
//! - block: whole responses with markup, damage phrasings and multi-line
//!   acquisitions

pub mod block;
pub mod rules;

pub use block::{BlockParse, parse_block};
pub use rules::{LineMatch, classify_line, parse_count};

use crate::domain::AdventureResult;

/// Parse a single line into a result.
///
/// Returns `None` for lines that are not results and for vague quantities
/// ("You gain a clue").
pub fn parse_line(text: &str) -> Option<AdventureResult> {
    classify_line(text).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultKind;

    #[test]
    fn test_parse_line_vague_quantities() {
        assert_eq!(parse_line("You gain a clue"), None);
        assert_eq!(parse_line("You gain some luck"), None);
    }

    #[test]
    fn test_parse_line_hit_points() {
        let result = parse_line("You lose 15 hit points").unwrap();
        assert_eq!(result.kind, ResultKind::Health);
        assert_eq!(result.count(), -15);
    }
}
