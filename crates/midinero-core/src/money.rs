//! Money and percentage helpers
//!
//! Amounts are persisted as integer cents and handled as [`Decimal`] everywhere
//! else. Every value that leaves the core is rounded to 2 decimal places.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Convert stored cents into a decimal amount
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a decimal amount into cents for storage
pub fn to_cents(amount: Decimal) -> Result<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::InvalidData(format!("Amount out of range: {}", amount)))
}

/// Round a monetary value to cents (half away from zero)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to 2 decimal places
pub fn round_pct(pct: Decimal) -> Decimal {
    pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, rounded. A zero denominator yields 0.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_pct)
        .unwrap_or(Decimal::ZERO)
}

/// `total / count`, or 0 when there is nothing to average
pub fn average(total: Decimal, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    total
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
}

/// Mean of a slice of values, `None` when empty or when the sum overflows
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    Some(average(total, values.len() as i64))
}

/// Parse a user-supplied amount ("1,234.50", "$12", "-3.2")
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    Decimal::from_str(&cleaned).map_err(|_| Error::InvalidData(format!("Invalid amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cents_conversion() {
        assert_eq!(from_cents(123456), dec!(1234.56));
        assert_eq!(to_cents(dec!(1234.56)).unwrap(), 123456);
        assert_eq!(to_cents(dec!(0.005)).unwrap(), 1);
    }

    #[test]
    fn test_to_cents_out_of_range() {
        assert!(matches!(to_cents(Decimal::MAX), Err(Error::InvalidData(_))));
        assert!(matches!(to_cents(Decimal::MIN), Err(Error::InvalidData(_))));
        // Fits a Decimal but not an i64 of cents
        assert!(to_cents(dec!(100000000000000000)).is_err());
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(dec!(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        assert_eq!(percentage(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percentage(dec!(600), dec!(500)), dec!(120));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[dec!(1000), dec!(950), dec!(900)]), Some(dec!(950)));
        assert_eq!(mean(&[Decimal::MAX, Decimal::MAX]), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.50").unwrap(), dec!(1234.50));
        assert_eq!(parse_amount(" 12 ").unwrap(), dec!(12));
        assert!(parse_amount("twelve").is_err());
    }
}
