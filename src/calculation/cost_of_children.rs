//! Cost-of-children table engine.
//!
//! The cost of a group of children is read from a progressive bracket
//! table selected by the age cohorts present and the number of assessable
//! children (capped at three). The total is then shared evenly across the
//! assessable children.

use rust_decimal::Decimal;

use crate::config::{CostBracket, CostOfChildrenTables, CostTableKind};
use crate::models::{ADULT_AGE, OLDER_COHORT_AGE};
use crate::models::CostBracketInfo;

/// The result of a cost-of-children lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCostResult {
    /// Total cost of the assessable children.
    pub total_cost: Decimal,
    /// Total cost shared evenly across the assessable children.
    pub cost_per_child: Decimal,
    /// Number of children the cost was shared across.
    pub assessable_children: usize,
    /// Table the cost was read from; `None` when nobody is assessable.
    pub table: Option<CostTableKind>,
    /// Bracket the income fell in; `None` when nobody is assessable.
    pub bracket: Option<CostBracketInfo>,
}

impl ChildCostResult {
    fn empty() -> Self {
        Self {
            total_cost: Decimal::ZERO,
            cost_per_child: Decimal::ZERO,
            assessable_children: 0,
            table: None,
            bracket: None,
        }
    }
}

/// Picks the cost table for a set of ages.
///
/// Adults are ignored. Returns the table kind and the number of assessable
/// children, or `None` when no child is assessable.
pub fn select_cost_table(ages: &[u8]) -> Option<(CostTableKind, usize)> {
    let under_13 = ages.iter().filter(|&&age| age < OLDER_COHORT_AGE).count();
    let thirteen_plus = ages
        .iter()
        .filter(|&&age| (OLDER_COHORT_AGE..ADULT_AGE).contains(&age))
        .count();

    let kind = match (under_13, thirteen_plus) {
        (0, 0) => return None,
        (_, 0) => CostTableKind::Under13,
        (0, _) => CostTableKind::ThirteenPlus,
        _ => CostTableKind::Mixed,
    };
    Some((kind, under_13 + thirteen_plus))
}

/// Finds the bracket `income` falls in and returns its cost and details.
///
/// The first bracket whose upper bound is at or above the income wins; the
/// open-ended final bracket catches everything else.
pub fn lookup_bracket(brackets: &[CostBracket], income: Decimal) -> Option<(Decimal, CostBracketInfo)> {
    let income = income.max(Decimal::ZERO);
    let bracket = brackets
        .iter()
        .find(|b| b.max_income.is_none_or(|max| income <= max))?;

    let income_in_bracket = (income - bracket.min_income).max(Decimal::ZERO);
    let cost = bracket.fixed + bracket.rate * income_in_bracket;

    Some((
        cost,
        CostBracketInfo {
            min_income: bracket.min_income,
            max_income: bracket.max_income,
            fixed: bracket.fixed,
            rate: bracket.rate,
            income_in_bracket,
        },
    ))
}

/// Calculates the cost of the children at the given income.
///
/// # Arguments
///
/// * `tables` - The year's cost-of-children tables
/// * `ages` - Ages of the children; ages of 18 and over are ignored
/// * `income` - Combined child support income, or a single parent's income
///   for the overseas and deceased parent formulas
///
/// # Examples
///
/// ```no_run
/// use child_support_engine::calculation::calculate_cost_of_children;
/// use child_support_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/child_support").unwrap();
/// let rates = loader.rates_for(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()).unwrap();
/// let cost = calculate_cost_of_children(&rates.cost_of_children, &[10], Decimal::from(77908));
/// assert_eq!(cost.total_cost, Decimal::new(1261785, 2));
/// ```
pub fn calculate_cost_of_children(
    tables: &CostOfChildrenTables,
    ages: &[u8],
    income: Decimal,
) -> ChildCostResult {
    let Some((kind, count)) = select_cost_table(ages) else {
        return ChildCostResult::empty();
    };

    let Some((total_cost, bracket)) = lookup_bracket(tables.brackets(kind, count), income) else {
        return ChildCostResult {
            assessable_children: count,
            table: Some(kind),
            ..ChildCostResult::empty()
        };
    };

    ChildCostResult {
        total_cost,
        cost_per_child: total_cost / Decimal::from(count),
        assessable_children: count,
        table: Some(kind),
        bracket: Some(bracket),
    }
}
