//! Fixed and minimum annual rates.
//!
//! These flat rates replace the percentage formula for low-income parents.
//! The fixed annual rate (FAR) is assessed child by child; the minimum
//! annual rate (MAR) is a single amount for the case. Both are limited
//! across a parent's cases: FAR to three children, MAR to three cases.

use rust_decimal::Decimal;

use crate::config::RateConfig;
use crate::models::ParentInput;

use super::round_to_dollar;

/// Care below which a parent on income support pays the minimum annual rate.
pub const MAR_CARE_THRESHOLD: u8 = 14;

/// Care below which a low-income parent pays the fixed annual rate.
pub const FAR_CARE_THRESHOLD: u8 = 35;

/// Children a parent pays the fixed annual rate for, across all cases.
pub const MAX_FAR_CHILDREN: usize = 3;

/// Cases a parent pays the minimum annual rate for.
pub const MAX_MAR_CASES: usize = 3;

/// A per-child or per-case rate after its multi-case limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedRate {
    /// Amount payable.
    pub amount: Decimal,
    /// Explanation of the limit, when one reduced the amount.
    pub explanation: Option<String>,
}

/// A parent's flat-rate position in the current case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentRateOutcome {
    /// FAR applies, indexed by assessable child.
    pub far_children: Vec<bool>,
    /// FAR for each child it applies to.
    pub far_per_child: Decimal,
    /// Explanation when the three-child limit reduced FAR.
    pub far_explanation: Option<String>,
    /// MAR payable for the case, when it applies.
    pub mar: Option<Decimal>,
    /// Explanation when the three-case limit reduced MAR.
    pub mar_explanation: Option<String>,
}

impl ParentRateOutcome {
    /// Whether FAR applies to the `index`-th assessable child.
    pub fn far_applies(&self, index: usize) -> bool {
        self.far_children.get(index).copied().unwrap_or(false)
    }

    /// Number of children in the current case attracting FAR.
    pub fn far_count(&self) -> usize {
        self.far_children.iter().filter(|&&applies| applies).count()
    }
}

/// Whether FAR applies to a parent for one child.
///
/// The parent must earn less than the maximum single parenting payment,
/// not receive income support, have under 35% care, and somebody must be
/// able to receive the payment.
pub fn fixed_annual_rate_applies(
    input: &ParentInput,
    rates: &RateConfig,
    rounded_care: u8,
    has_recipient: bool,
) -> bool {
    input.adjusted_taxable_income < rates.max_parenting_payment_single
        && !input.receives_income_support
        && rounded_care < FAR_CARE_THRESHOLD
        && has_recipient
}

/// Whether MAR applies to a parent for the case.
///
/// The parent must receive income support, earn less than the self-support
/// amount, have under 14% care of every child, and somebody must be able to
/// receive the payment.
pub fn minimum_annual_rate_applies(
    input: &ParentInput,
    rates: &RateConfig,
    rounded_cares: &[u8],
    has_recipient: bool,
) -> bool {
    low_income_support(input, rates)
        && !rounded_cares.is_empty()
        && rounded_cares.iter().all(|&care| care < MAR_CARE_THRESHOLD)
        && has_recipient
}

/// A low-income parent on income support escapes MAR through their care.
pub fn mar_prevented_by_care(input: &ParentInput, rates: &RateConfig, rounded_cares: &[u8]) -> bool {
    low_income_support(input, rates)
        && rounded_cares.iter().any(|&care| care >= MAR_CARE_THRESHOLD)
}

fn low_income_support(input: &ParentInput, rates: &RateConfig) -> bool {
    input.receives_income_support && input.adjusted_taxable_income < rates.self_support_amount
}

/// FAR per child once the three-child limit is spread over `total_children`.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::far_per_child;
/// use rust_decimal::Decimal;
///
/// assert_eq!(far_per_child(Decimal::from(1825), 2).amount, Decimal::from(1825));
/// // 3 × 1825 / 5 = 1095
/// assert_eq!(far_per_child(Decimal::from(1825), 5).amount, Decimal::from(1095));
/// ```
pub fn far_per_child(fixed_annual_rate: Decimal, total_children: usize) -> LimitedRate {
    if total_children <= MAX_FAR_CHILDREN {
        return LimitedRate {
            amount: fixed_annual_rate,
            explanation: None,
        };
    }
    let amount = round_to_dollar(
        fixed_annual_rate * Decimal::from(MAX_FAR_CHILDREN) / Decimal::from(total_children),
    );
    LimitedRate {
        amount,
        explanation: Some(format!(
            "The fixed annual rate is payable for at most {} children. It is shared across all {} \
             children: {} × ${} / {} = ${} per child.",
            MAX_FAR_CHILDREN,
            total_children,
            MAX_FAR_CHILDREN,
            fixed_annual_rate.normalize(),
            total_children,
            amount.normalize()
        )),
    }
}

/// MAR for the case once the three-case limit is spread over `total_cases`.
pub fn mar_per_case(minimum_annual_rate: Decimal, total_cases: usize) -> LimitedRate {
    if total_cases <= MAX_MAR_CASES {
        return LimitedRate {
            amount: minimum_annual_rate,
            explanation: None,
        };
    }
    let amount = round_to_dollar(
        minimum_annual_rate * Decimal::from(MAX_MAR_CASES) / Decimal::from(total_cases),
    );
    LimitedRate {
        amount,
        explanation: Some(format!(
            "The minimum annual rate is payable for at most {} cases. It is shared across all {} \
             cases: {} × ${} / {} = ${} for this case.",
            MAX_MAR_CASES,
            total_cases,
            MAX_MAR_CASES,
            minimum_annual_rate.normalize(),
            total_cases,
            amount.normalize()
        )),
    }
}

/// Assesses FAR and MAR for one parent.
///
/// # Arguments
///
/// * `input` - The parent's income inputs
/// * `rates` - Rates effective on the assessment date
/// * `rounded_cares` - The parent's rounded care, per assessable child
/// * `has_recipient` - Whether somebody can receive a flat rate, per
///   assessable child
/// * `other_case_children` - Assessable children in the parent's other cases
/// * `total_cases` - The parent's cases, the current one included
///
/// FAR is assessed first. MAR is only considered when no child attracts FAR.
pub fn assess_parent_rates(
    input: &ParentInput,
    rates: &RateConfig,
    rounded_cares: &[u8],
    has_recipient: &[bool],
    other_case_children: usize,
    total_cases: usize,
) -> ParentRateOutcome {
    let far_children: Vec<bool> = rounded_cares
        .iter()
        .zip(has_recipient)
        .map(|(&care, &recipient)| fixed_annual_rate_applies(input, rates, care, recipient))
        .collect();
    let far_count = far_children.iter().filter(|&&applies| applies).count();

    if far_count > 0 {
        let far = far_per_child(rates.fixed_annual_rate, far_count + other_case_children);
        return ParentRateOutcome {
            far_children,
            far_per_child: far.amount,
            far_explanation: far.explanation,
            ..ParentRateOutcome::default()
        };
    }

    let any_recipient = has_recipient.iter().any(|&recipient| recipient);
    let mar = minimum_annual_rate_applies(input, rates, rounded_cares, any_recipient)
        .then(|| mar_per_case(rates.minimum_annual_rate, total_cases));

    ParentRateOutcome {
        far_children,
        far_per_child: Decimal::ZERO,
        far_explanation: None,
        mar_explanation: mar.as_ref().and_then(|m| m.explanation.clone()),
        mar: mar.map(|m| m.amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::cost_of_children::tests::tables_2026;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates() -> RateConfig {
        RateConfig {
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            self_support_amount: dec("31046"),
            fixed_annual_rate: dec("1825"),
            minimum_annual_rate: dec("551"),
            max_parenting_payment_single: dec("26720"),
            cost_of_children: tables_2026(),
        }
    }

    fn on_support(ati: &str) -> ParentInput {
        ParentInput {
            receives_income_support: true,
            ..ParentInput::with_income(dec(ati))
        }
    }

    // ==========================================================================
    // Fixed annual rate
    // ==========================================================================

    #[test]
    fn test_far_applies_to_low_income_parent() {
        let input = ParentInput::with_income(dec("20000"));
        assert!(fixed_annual_rate_applies(&input, &rates(), 0, true));
        assert!(fixed_annual_rate_applies(&input, &rates(), 34, true));
    }

    #[test]
    fn test_far_excluded_by_care_support_income_or_recipient() {
        let input = ParentInput::with_income(dec("20000"));
        assert!(!fixed_annual_rate_applies(&input, &rates(), 35, true));
        assert!(!fixed_annual_rate_applies(&input, &rates(), 0, false));
        assert!(!fixed_annual_rate_applies(&on_support("20000"), &rates(), 0, true));
        assert!(!fixed_annual_rate_applies(
            &ParentInput::with_income(dec("26720")),
            &rates(),
            0,
            true
        ));
    }

    #[test]
    fn test_far_limited_to_three_children() {
        let outcome = assess_parent_rates(
            &ParentInput::with_income(dec("20000")),
            &rates(),
            &[0, 0],
            &[true, true],
            3,
            2,
        );
        assert_eq!(outcome.far_count(), 2);
        assert_eq!(outcome.far_per_child, dec("1095"));
        assert!(outcome.far_explanation.unwrap().contains("at most 3 children"));
        assert_eq!(outcome.mar, None);
    }

    #[test]
    fn test_far_per_child_without_limit() {
        let outcome = assess_parent_rates(
            &ParentInput::with_income(dec("20000")),
            &rates(),
            &[0, 40],
            &[true, true],
            0,
            1,
        );
        assert!(outcome.far_applies(0));
        assert!(!outcome.far_applies(1));
        assert_eq!(outcome.far_per_child, dec("1825"));
        assert_eq!(outcome.far_explanation, None);
    }

    // ==========================================================================
    // Minimum annual rate
    // ==========================================================================

    #[test]
    fn test_mar_applies_to_parent_on_support() {
        let outcome =
            assess_parent_rates(&on_support("15000"), &rates(), &[0, 13], &[true, true], 0, 1);
        assert_eq!(outcome.far_count(), 0);
        assert_eq!(outcome.mar, Some(dec("551")));
        assert_eq!(outcome.mar_explanation, None);
    }

    #[test]
    fn test_mar_prevented_by_regular_care() {
        let input = on_support("15000");
        assert!(!minimum_annual_rate_applies(&input, &rates(), &[0, 14], true));
        assert!(mar_prevented_by_care(&input, &rates(), &[0, 14]));
        assert!(!mar_prevented_by_care(&input, &rates(), &[0, 13]));
    }

    #[test]
    fn test_mar_needs_income_below_self_support() {
        assert!(!minimum_annual_rate_applies(&on_support("31046"), &rates(), &[0], true));
    }

    #[test]
    fn test_mar_limited_to_three_cases() {
        let limited = mar_per_case(dec("551"), 4);
        // 3 × 551 / 4 = 413.25
        assert_eq!(limited.amount, dec("413"));
        assert!(limited.explanation.unwrap().contains("4 cases"));
        assert_eq!(mar_per_case(dec("551"), 3).amount, dec("551"));
    }

    #[test]
    fn test_no_flat_rate_for_ordinary_income() {
        let outcome = assess_parent_rates(
            &ParentInput::with_income(dec("80000")),
            &rates(),
            &[0],
            &[true],
            0,
            1,
        );
        assert_eq!(outcome.far_count(), 0);
        assert_eq!(outcome.mar, None);
    }
}
