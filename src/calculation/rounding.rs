//! Rounding helpers.
//!
//! Liabilities are rounded to the whole dollar, half away from zero.
//! Everything else is carried at full decimal precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to the nearest whole dollar.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::round_to_dollar;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_to_dollar(Decimal::new(12617_85, 2)), Decimal::from(12618));
/// assert_eq!(round_to_dollar(Decimal::new(5, 1)), Decimal::ONE);
/// ```
pub fn round_to_dollar(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount × percentage / 100`, unrounded.
pub fn percentage_of(amount: Decimal, percentage: Decimal) -> Decimal {
    amount * percentage / Decimal::ONE_HUNDRED
}

/// Splits a whole-dollar total into `parts` whole-dollar shares.
///
/// Earlier shares absorb the remainder, so the shares always sum to the
/// rounded total.
pub fn split_evenly(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }
    let total = round_to_dollar(total);
    let count = Decimal::from(parts);
    let base = (total / count).floor();
    let mut remainder = total - base * count;

    (0..parts)
        .map(|_| {
            if remainder >= Decimal::ONE {
                remainder -= Decimal::ONE;
                base + Decimal::ONE
            } else {
                base
            }
        })
        .collect()
}
