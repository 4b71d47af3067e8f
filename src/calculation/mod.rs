//! Calculation logic for the child support engine.
//!
//! This module contains the steps of a child support assessment: care
//! conversion and cost percentages, child support income, the cost of
//! children, percentage-formula liabilities, fixed and minimum annual rates,
//! multi-case allowances and caps, distribution to non-parent carers, and
//! payment resolution. [`compute`] runs them in order.

mod annual_rates;
mod care;
mod cost_of_children;
mod cost_percentage;
mod formula;
mod income;
mod liability;
mod multi_case;
mod non_parent_carer;
mod payment;
mod rounding;
mod validation;

pub use annual_rates::{
    FAR_CARE_THRESHOLD, LimitedRate, MAR_CARE_THRESHOLD, MAX_FAR_CHILDREN, MAX_MAR_CASES,
    ParentRateOutcome, assess_parent_rates, far_per_child, fixed_annual_rate_applies,
    mar_per_case, mar_prevented_by_care, minimum_annual_rate_applies,
};
pub use care::{
    CareShare, ChildCare, convert_care_to_percentage, resolve_child_care, round_care_percentage,
};
pub use cost_of_children::{
    ChildCostResult, calculate_cost_of_children, lookup_bracket, select_cost_table,
};
pub use cost_percentage::cost_percentage;
pub use formula::compute;
pub use income::{
    NOTIONAL_THIRTEEN_PLUS_AGE, NOTIONAL_UNDER_13_AGE, ParentIncome, income_percentages,
    relevant_dependent_allowance, resolve_parent_income,
};
pub use liability::{
    RECEIVING_CARE_THRESHOLD, child_support_percentage, halved_liability,
    parent_to_parent_payer, standard_liability,
};
pub use multi_case::{
    CapOutcome, MultiCaseAssessment, apply_multi_case_cap, assess_multi_case, count_cases,
    multi_case_allowance, multi_case_breakdown, multi_case_cap,
};
pub use non_parent_carer::{
    CarerSplit, Recipient, RecipientShare, carer_portion, distribute_by_cost,
    distribute_to_highest_care, eligible_recipients, parent_portion, split_between_carers,
};
pub use payment::{PaymentResolution, detect_zero_payment, resolve_payment};
pub use rounding::{percentage_of, round_to_dollar, split_evenly};
pub use validation::{MAX_ADJUSTED_TAXABLE_INCOME, MAX_CHILD_AGE, validate_inputs};
