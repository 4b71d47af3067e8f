//! Income resolution.
//!
//! Turns a parent's adjusted taxable income into child support income by
//! deducting the self-support amount, the relevant dependent allowance and,
//! for a multi-case parent, the multi-case allowance.

use std::iter;

use rust_decimal::Decimal;

use crate::config::{CostOfChildrenTables, RateConfig};
use crate::models::{ParentFinancials, ParentInput, RelevantDependents};

use super::{MultiCaseAssessment, assess_multi_case, calculate_cost_of_children};

/// Age given to notional relevant dependents under 13.
pub const NOTIONAL_UNDER_13_AGE: u8 = 6;

/// Age given to notional relevant dependents aged 13 or over.
pub const NOTIONAL_THIRTEEN_PLUS_AGE: u8 = 14;

/// A parent's resolved income.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentIncome {
    /// Income components.
    pub financials: ParentFinancials,
    /// Multi-case position, for a parent flagged as multi-case.
    pub multi_case: Option<MultiCaseAssessment>,
}

impl ParentIncome {
    /// Child support income.
    pub fn child_support_income(&self) -> Decimal {
        self.financials.child_support_income()
    }

    /// Income of a parent who takes no part in the assessment.
    pub fn absent(self_support_amount: Decimal) -> Self {
        Self {
            financials: ParentFinancials {
                adjusted_taxable_income: Decimal::ZERO,
                self_support_amount,
                relevant_dependent_allowance: Decimal::ZERO,
                multi_case_allowance: Decimal::ZERO,
            },
            multi_case: None,
        }
    }
}

/// Allowance for a parent's relevant dependents.
///
/// The cost of a notional family of the dependents, with children under 13
/// aged 6 and older children aged 14, at `max(0, ATI − SSA)`.
///
/// The cost tables stop growing at three children, so at most three
/// notional children of each cohort are costed.
pub fn relevant_dependent_allowance(
    tables: &CostOfChildrenTables,
    dependents: &RelevantDependents,
    adjusted_taxable_income: Decimal,
    self_support_amount: Decimal,
) -> Decimal {
    if dependents.is_empty() {
        return Decimal::ZERO;
    }
    let income = (adjusted_taxable_income - self_support_amount).max(Decimal::ZERO);
    let ages: Vec<u8> = iter::repeat_n(NOTIONAL_UNDER_13_AGE, dependents.under_13.min(3) as usize)
        .chain(iter::repeat_n(
            NOTIONAL_THIRTEEN_PLUS_AGE,
            dependents.thirteen_plus.min(3) as usize,
        ))
        .collect();
    calculate_cost_of_children(tables, &ages, income).total_cost
}

/// Splits combined child support income into each parent's percentage.
///
/// Parent B's percentage is `100 − A` so the pair always sums to 100. With
/// no combined income each parent is given 50.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::income_percentages;
/// use rust_decimal::Decimal;
///
/// let (a, b) = income_percentages(Decimal::from(60000), Decimal::from(40000));
/// assert_eq!(a, Decimal::from(60));
/// assert_eq!(b, Decimal::from(40));
/// ```
pub fn income_percentages(csi_a: Decimal, csi_b: Decimal) -> (Decimal, Decimal) {
    let combined = csi_a + csi_b;
    if combined.is_zero() {
        let half = Decimal::from(50);
        return (half, half);
    }
    let a = csi_a / combined * Decimal::ONE_HUNDRED;
    (a, Decimal::ONE_HUNDRED - a)
}

/// Resolves a parent's child support income.
///
/// # Arguments
///
/// * `input` - The parent's income inputs
/// * `rates` - Rates effective on the assessment date
/// * `current_ages` - Ages of the assessable children in the current case
/// * `multi_case` - Whether the parent has children in other cases
pub fn resolve_parent_income(
    input: &ParentInput,
    rates: &RateConfig,
    current_ages: &[u8],
    multi_case: bool,
) -> ParentIncome {
    let relevant_dependent_allowance = relevant_dependent_allowance(
        &rates.cost_of_children,
        &input.relevant_dependents,
        input.adjusted_taxable_income,
        rates.self_support_amount,
    );

    let mut financials = ParentFinancials {
        adjusted_taxable_income: input.adjusted_taxable_income,
        self_support_amount: rates.self_support_amount,
        relevant_dependent_allowance,
        multi_case_allowance: Decimal::ZERO,
    };

    let multi_case = multi_case.then(|| {
        assess_multi_case(
            &rates.cost_of_children,
            current_ages,
            &input.other_case_children,
            financials.income_above_self_support(),
            financials.preliminary_income(),
        )
    });
    if let Some(assessment) = &multi_case {
        financials.multi_case_allowance = assessment.allowance;
    }

    ParentIncome {
        financials,
        multi_case,
    }
}
