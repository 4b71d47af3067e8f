//! Percentage-formula liability.

use rust_decimal::Decimal;

use crate::models::Parent;

use super::{percentage_of, round_to_dollar};

/// Rounded care a parent or carer needs to receive child support.
pub const RECEIVING_CARE_THRESHOLD: u8 = 35;

/// `max(0, income percentage − cost percentage)`.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::child_support_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(child_support_percentage(Decimal::from(60), 24), Decimal::from(36));
/// assert_eq!(child_support_percentage(Decimal::from(20), 76), Decimal::ZERO);
/// ```
pub fn child_support_percentage(income_percentage: Decimal, cost_percentage: u8) -> Decimal {
    (income_percentage - Decimal::from(cost_percentage)).max(Decimal::ZERO)
}

/// `round(cost per child × child support percentage / 100)`.
pub fn standard_liability(cost_per_child: Decimal, child_support_percentage: Decimal) -> Decimal {
    round_to_dollar(percentage_of(cost_per_child, child_support_percentage))
}

/// The standard liability halved before rounding, for a parent whose income
/// was doubled to cost the children.
pub fn halved_liability(cost_per_child: Decimal, child_support_percentage: Decimal) -> Decimal {
    round_to_dollar(percentage_of(cost_per_child, child_support_percentage) / Decimal::TWO)
}

/// Works out which parent, if either, pays the other for a child.
///
/// A parent pays when their child support percentage is positive and
/// strictly higher than the other parent's, and the other parent has at
/// least 35% care.
pub fn parent_to_parent_payer(
    child_support_perc_a: Decimal,
    child_support_perc_b: Decimal,
    rounded_care_a: u8,
    rounded_care_b: u8,
) -> Option<Parent> {
    if child_support_perc_a > child_support_perc_b
        && child_support_perc_a > Decimal::ZERO
        && rounded_care_b >= RECEIVING_CARE_THRESHOLD
    {
        Some(Parent::ParentA)
    } else if child_support_perc_b > child_support_perc_a
        && child_support_perc_b > Decimal::ZERO
        && rounded_care_a >= RECEIVING_CARE_THRESHOLD
    {
        Some(Parent::ParentB)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// LIA-001: golden fixture, 12000 cost at 60% income and no care
    #[test]
    fn test_lia_001_golden_fixture() {
        let cs = child_support_percentage(dec("60"), 0);
        assert_eq!(cs, dec("60"));
        assert_eq!(standard_liability(dec("12000"), cs), dec("7200"));
    }

    /// LIA-002: income share below cost share gives no liability
    #[test]
    fn test_lia_002_negative_gap_clamped() {
        let cs = child_support_percentage(dec("83.71"), 100);
        assert_eq!(cs, Decimal::ZERO);
        assert_eq!(standard_liability(dec("6822.72"), cs), Decimal::ZERO);
    }

    /// LIA-003: rounding to the dollar happens once, at the end
    #[test]
    fn test_lia_003_rounds_half_away_from_zero() {
        // 12617.85 × 62.8357% = 7928.51
        let (a, _) = crate::calculation::income_percentages(dec("48954"), dec("28954"));
        assert_eq!(standard_liability(dec("12617.85"), a), dec("7929"));
        assert_eq!(standard_liability(dec("1001"), dec("50")), dec("501"));
    }

    #[test]
    fn test_halved_liability_rounds_after_halving() {
        // 10000 × 75% = 7500, halved 3750
        assert_eq!(halved_liability(dec("10000"), dec("75")), dec("3750"));
        // 1001 × 100% / 2 = 500.5
        assert_eq!(halved_liability(dec("1001"), dec("100")), dec("501"));
    }

    #[test]
    fn test_payer_needs_receiving_care() {
        assert_eq!(
            parent_to_parent_payer(dec("36"), Decimal::ZERO, 0, 100),
            Some(Parent::ParentA)
        );
        assert_eq!(parent_to_parent_payer(dec("36"), Decimal::ZERO, 66, 34), None);
    }

    #[test]
    fn test_payer_needs_strictly_higher_percentage() {
        assert_eq!(parent_to_parent_payer(dec("10"), dec("10"), 50, 50), None);
        assert_eq!(
            parent_to_parent_payer(dec("4"), dec("10"), 50, 50),
            Some(Parent::ParentB)
        );
    }

    #[test]
    fn test_no_payer_when_both_zero() {
        assert_eq!(
            parent_to_parent_payer(Decimal::ZERO, Decimal::ZERO, 50, 50),
            None
        );
    }
}
