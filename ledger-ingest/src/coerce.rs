//! Lenient numeric coercion.
//!
//! Cells that do not parse become zero. This never fails.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a ledger number, dropping thousands separators. Blank, missing or
/// malformed input yields zero.
pub fn coerce_number(raw: &str) -> Decimal {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned);
    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Integer part of `value`, truncated toward zero.
pub fn truncate(value: Decimal) -> i64 {
    value.trunc().to_i64().unwrap_or(0)
}

/// `amount × rate`, rounded to the nearest integer with halves away from zero.
pub fn to_base_currency(amount: Decimal, rate: Decimal) -> i64 {
    amount
        .checked_mul(rate)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Largest of `values` truncated toward zero; zero when there are none.
pub fn settled_amount(values: impl IntoIterator<Item = Decimal>) -> i64 {
    values.into_iter().max().map(truncate).unwrap_or(0)
}
