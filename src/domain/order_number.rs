//! Sequential per-year order numbers
//!
//! Format: `DTF-{year}-{sequence:04}`. The sequence restarts at 1 every
//! calendar year and is derived from the highest existing number for that
//! year. Derivation is pure; the store calls it while holding its write
//! lock so the reserve-and-commit pair is atomic.

use regex::Regex;
use std::sync::OnceLock;

const PREFIX: &str = "DTF";

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^DTF-(\d{4})-(\d+)$").expect("valid order number regex"))
}

/// Parse the (year, sequence) pair out of an order number. Malformed
/// numbers yield `None` and are skipped during derivation.
pub fn parse_order_number(number: &str) -> Option<(i32, u32)> {
    let captures = number_pattern().captures(number)?;
    let year = captures.get(1)?.as_str().parse().ok()?;
    let sequence = captures.get(2)?.as_str().parse().ok()?;
    Some((year, sequence))
}

/// Derive the next order number for `year` from the existing numbers.
pub fn next_order_number<'a>(existing: impl IntoIterator<Item = &'a str>, year: i32) -> String {
    let max_sequence = existing
        .into_iter()
        .filter_map(parse_order_number)
        .filter(|(y, _)| *y == year)
        .map(|(_, sequence)| sequence)
        .max()
        .unwrap_or(0);

    format!("{}-{}-{:04}", PREFIX, year, max_sequence + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_of_a_year_is_0001() {
        assert_eq!(next_order_number([], 2025), "DTF-2025-0001");
    }

    #[test]
    fn increments_highest_existing_sequence() {
        let existing = ["DTF-2025-0001", "DTF-2025-0007", "DTF-2025-0003"];
        assert_eq!(next_order_number(existing, 2025), "DTF-2025-0008");
    }

    #[test]
    fn sequence_resets_on_year_rollover() {
        let existing = ["DTF-2024-0042", "DTF-2024-0043"];
        assert_eq!(next_order_number(existing, 2025), "DTF-2025-0001");
    }

    #[test]
    fn ignores_other_years_and_malformed_numbers() {
        let existing = ["DTF-2024-0099", "garbage", "DTF-2025-0002", "DTF-XXXX-1"];
        assert_eq!(next_order_number(existing, 2025), "DTF-2025-0003");
    }

    #[test]
    fn sequence_grows_past_four_digits() {
        let existing = ["DTF-2025-9999"];
        assert_eq!(next_order_number(existing, 2025), "DTF-2025-10000");
    }

    #[test]
    fn serial_creation_yields_distinct_gapless_numbers() {
        let mut numbers: Vec<String> = Vec::new();
        for _ in 0..20 {
            let next = next_order_number(numbers.iter().map(String::as_str), 2025);
            numbers.push(next);
        }
        for (i, number) in numbers.iter().enumerate() {
            assert_eq!(*number, format!("DTF-2025-{:04}", i + 1));
        }
    }

    #[test]
    fn parses_roundtrip() {
        assert_eq!(parse_order_number("DTF-2025-0012"), Some((2025, 12)));
        assert_eq!(parse_order_number("DTF-25-0012"), None);
        assert_eq!(parse_order_number("ORD-2025-0012"), None);
    }
}
