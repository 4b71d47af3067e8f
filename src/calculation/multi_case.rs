//! Multi-case allowance and cap.
//!
//! A parent with children in more than one case gets an allowance for the
//! cost of their other-case children, and their liability for each child in
//! the current case is capped at what it would be if every one of their
//! children were in a single case. Both use the same-age rule: the cost of a
//! child is the cost of `N` children of that child's age, divided by `N`,
//! where `N` counts all of the parent's assessable children.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::config::CostOfChildrenTables;
use crate::models::{ADULT_AGE, MultiCaseChildBreakdown, OtherCaseChild};

use super::{calculate_cost_of_children, percentage_of, round_to_dollar};

/// A parent's multi-case position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCaseAssessment {
    /// Same-age cost of every assessable child at `max(0, ATI − SSA)`: the
    /// current case's children first, in input order, then the other cases'
    /// children.
    pub breakdown: Vec<MultiCaseChildBreakdown>,
    /// Same-age cost of each current-case child at the preliminary income.
    pub cap_costs: Vec<Decimal>,
    /// Allowance deducted from the parent's income.
    pub allowance: Decimal,
    /// Number of cases including the current one.
    pub total_cases: usize,
    /// Number of assessable children in the parent's other cases.
    pub other_children: usize,
}

impl MultiCaseAssessment {
    /// Same-age cost of the `index`-th assessable child of the current case,
    /// as used for its cap.
    pub fn notional_cost(&self, index: usize) -> Option<Decimal> {
        self.cap_costs.get(index).copied()
    }
}

/// Outcome of applying a multi-case cap to one liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapOutcome {
    /// The liability after the cap.
    pub liability: Decimal,
    /// The cap itself.
    pub cap: Decimal,
    /// The cap was lower than the uncapped liability.
    pub cap_applied: bool,
}

fn same_age_cost(tables: &CostOfChildrenTables, age: u8, children: usize, income: Decimal) -> Decimal {
    let ages = vec![age; children];
    calculate_cost_of_children(tables, &ages, income).cost_per_child
}

/// Builds the same-age cost breakdown across all of a parent's children.
///
/// Adult children in other cases are left out.
pub fn multi_case_breakdown(
    tables: &CostOfChildrenTables,
    current_ages: &[u8],
    other_children: &[OtherCaseChild],
    preliminary_income: Decimal,
) -> Vec<MultiCaseChildBreakdown> {
    let current = current_ages.iter().map(|&age| (age, true));
    let other = other_children
        .iter()
        .filter(|child| child.age < ADULT_AGE)
        .map(|child| (child.age, false));
    let children: Vec<(u8, bool)> = current.chain(other).collect();
    let total = children.len();

    children
        .into_iter()
        .map(|(age, is_current_case)| MultiCaseChildBreakdown {
            child_age: age,
            is_current_case,
            cost_per_child: same_age_cost(tables, age, total, preliminary_income),
        })
        .collect()
}

/// Sums the other cases' entries of a breakdown, rounded to the dollar.
pub fn multi_case_allowance(breakdown: &[MultiCaseChildBreakdown]) -> Decimal {
    round_to_dollar(
        breakdown
            .iter()
            .filter(|entry| !entry.is_current_case)
            .map(|entry| entry.cost_per_child)
            .sum(),
    )
}

/// Counts the parent's cases, the current case included.
///
/// Other-case children sharing a `case_id` belong to one case; a child
/// without a `case_id` is a case of its own.
pub fn count_cases(other_children: &[OtherCaseChild]) -> usize {
    let mut ids = HashSet::new();
    let mut unlabelled = 0;
    for child in other_children.iter().filter(|c| c.age < ADULT_AGE) {
        match &child.case_id {
            Some(id) => {
                ids.insert(id.as_str());
            }
            None => unlabelled += 1,
        }
    }
    1 + ids.len() + unlabelled
}

/// Assesses a parent's multi-case position.
///
/// # Arguments
///
/// * `allowance_income` - `max(0, ATI − SSA)`; the allowance and the
///   reported breakdown are costed at this income
/// * `preliminary_income` - Income after relevant dependents; the caps'
///   notional costs are costed at this income
pub fn assess_multi_case(
    tables: &CostOfChildrenTables,
    current_ages: &[u8],
    other_children: &[OtherCaseChild],
    allowance_income: Decimal,
    preliminary_income: Decimal,
) -> MultiCaseAssessment {
    let breakdown = multi_case_breakdown(tables, current_ages, other_children, allowance_income);
    let allowance = multi_case_allowance(&breakdown);
    let other = breakdown.iter().filter(|e| !e.is_current_case).count();

    let current_costs = |entries: &[MultiCaseChildBreakdown]| -> Vec<Decimal> {
        entries
            .iter()
            .filter(|entry| entry.is_current_case)
            .map(|entry| entry.cost_per_child)
            .collect()
    };
    let cap_costs = if preliminary_income == allowance_income {
        current_costs(&breakdown)
    } else {
        current_costs(&multi_case_breakdown(
            tables,
            current_ages,
            other_children,
            preliminary_income,
        ))
    };

    MultiCaseAssessment {
        breakdown,
        cap_costs,
        allowance,
        total_cases: count_cases(other_children),
        other_children: other,
    }
}

/// The multi-case cap for one child: the notional cost of the child less
/// the parent's own cost share, rounded to the dollar.
///
/// # Example
///
/// ```
/// use child_support_engine::calculation::multi_case_cap;
/// use rust_decimal::Decimal;
///
/// assert_eq!(multi_case_cap(Decimal::from(6000), 24), Decimal::from(4560));
/// ```
pub fn multi_case_cap(notional_cost: Decimal, cost_percentage: u8) -> Decimal {
    let uncovered = Decimal::ONE_HUNDRED - Decimal::from(cost_percentage);
    round_to_dollar(percentage_of(notional_cost, uncovered.max(Decimal::ZERO)))
}

/// Limits a standard liability to its multi-case cap.
pub fn apply_multi_case_cap(standard: Decimal, cap: Decimal) -> CapOutcome {
    CapOutcome {
        liability: standard.min(cap),
        cap,
        cap_applied: cap < standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::cost_of_children::tests::tables_2026;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn other(age: u8, case_id: Option<&str>) -> OtherCaseChild {
        OtherCaseChild {
            age,
            case_id: case_id.map(str::to_string),
        }
    }

    #[test]
    fn test_breakdown_lists_current_children_first() {
        let breakdown = multi_case_breakdown(
            &tables_2026(),
            &[8],
            &[other(15, Some("b")), other(5, Some("b"))],
            dec("40000"),
        );

        let ages: Vec<u8> = breakdown.iter().map(|e| e.child_age).collect();
        assert_eq!(ages, vec![8, 15, 5]);
        assert!(breakdown[0].is_current_case);
        assert!(!breakdown[1].is_current_case);
    }

    #[test]
    fn test_same_age_rule_uses_all_children() {
        // Three children under 13 at 40000: 40000 × 0.27 = 10800, /3 = 3600
        // Three children 13+ at 40000: 40000 × 0.32 = 12800, /3 = 4266.67
        let breakdown =
            multi_case_breakdown(&tables_2026(), &[8], &[other(15, None), other(5, None)], dec("40000"));

        assert_eq!(breakdown[0].cost_per_child, dec("3600"));
        assert_eq!(breakdown[2].cost_per_child, dec("3600"));
        assert_eq!(breakdown[1].cost_per_child.round_dp(2), dec("4266.67"));
    }

    #[test]
    fn test_allowance_sums_other_case_children() {
        let assessment = assess_multi_case(
            &tables_2026(),
            &[8],
            &[other(15, None), other(5, None)],
            dec("40000"),
            dec("40000"),
        );
        // 4266.666... + 3600 = 7866.67, rounds to 7867
        assert_eq!(assessment.allowance, dec("7867"));
        assert_eq!(assessment.other_children, 2);
        assert_eq!(assessment.notional_cost(0), Some(dec("3600")));
        assert_eq!(assessment.notional_cost(1), None);
    }

    #[test]
    fn test_caps_use_preliminary_income() {
        // Allowance at 40000: two under-13 children, 40000 × 0.24 / 2 = 4800.
        // Caps at 33200: 33200 × 0.24 / 2 = 3984.
        let assessment =
            assess_multi_case(&tables_2026(), &[8], &[other(4, None)], dec("40000"), dec("33200"));
        assert_eq!(assessment.allowance, dec("4800"));
        assert_eq!(assessment.breakdown[1].cost_per_child, dec("4800"));
        assert_eq!(assessment.notional_cost(0), Some(dec("3984")));
    }

    #[test]
    fn test_adult_other_case_children_ignored() {
        let assessment =
            assess_multi_case(&tables_2026(), &[8], &[other(19, Some("x"))], dec("40000"), dec("40000"));
        assert_eq!(assessment.allowance, Decimal::ZERO);
        assert_eq!(assessment.total_cases, 1);
        assert_eq!(assessment.breakdown.len(), 1);
    }

    #[test]
    fn test_zero_preliminary_income_gives_zero_allowance() {
        let assessment = assess_multi_case(&tables_2026(), &[8], &[other(4, None)], Decimal::ZERO, Decimal::ZERO);
        assert_eq!(assessment.allowance, Decimal::ZERO);
    }

    #[test]
    fn test_count_cases_groups_by_case_id() {
        let children = [
            other(3, Some("x")),
            other(5, Some("x")),
            other(7, Some("y")),
            other(9, None),
            other(11, None),
        ];
        assert_eq!(count_cases(&children), 5);
        assert_eq!(count_cases(&[]), 1);
    }

    #[test]
    fn test_cap_applied_only_when_lower() {
        let capped = apply_multi_case_cap(dec("5000"), dec("4560"));
        assert_eq!(capped.liability, dec("4560"));
        assert!(capped.cap_applied);

        let uncapped = apply_multi_case_cap(dec("4000"), dec("4560"));
        assert_eq!(uncapped.liability, dec("4000"));
        assert!(!uncapped.cap_applied);

        let equal = apply_multi_case_cap(dec("4560"), dec("4560"));
        assert!(!equal.cap_applied);
    }

    #[test]
    fn test_cap_with_full_cost_share_is_zero() {
        assert_eq!(multi_case_cap(dec("6000"), 100), Decimal::ZERO);
    }
}
