//! Order numbers
//!
//! Human-readable, date-scoped order identifiers of the form
//! `PP-YYMMDD-XXXX`: a two-character store prefix, the order date, and a
//! random four-character uppercase base-36 suffix. Uniqueness is
//! probabilistic (a 1/36⁴ collision space per store per day) and deliberately
//! not checked against existing orders.

use chrono::NaiveDate;
use rand::Rng;

/// The default store prefix.
pub const DEFAULT_PREFIX: &str = "MM";

const SUFFIX_LEN: usize = 4;

/// Generates an order number for the given store prefix and date.
///
/// Pure in its inputs: the same date and rng state always produce the same
/// number.
pub fn order_number(prefix: &str, date: NaiveDate, rng: &mut impl Rng) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let digit = rng.random_range(0..36u32);
            char::from_digit(digit, 36)
                .unwrap_or('0')
                .to_ascii_uppercase()
        })
        .collect();
    format!("{prefix}-{}-{suffix}", date.format("%y%m%d"))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn number_matches_published_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let number = order_number(DEFAULT_PREFIX, date(), &mut rng);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "MM");
        assert_eq!(parts[1], "260830");
        assert_eq!(parts[2].len(), 4);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn same_seed_same_number() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        assert_eq!(
            order_number("MM", date(), &mut a),
            order_number("MM", date(), &mut b)
        );
    }

    #[test]
    fn suffixes_vary_across_draws() {
        let mut rng = StdRng::seed_from_u64(1);
        let first = order_number("MM", date(), &mut rng);
        let second = order_number("MM", date(), &mut rng);

        assert_ne!(first, second);
    }
}
