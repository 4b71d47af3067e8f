//! Core data models for the child support engine.
//!
//! Inputs ([`CalculatorInputs`], [`CaseConfiguration`]) are plain serde
//! types. Outputs are gathered into [`CalculationResults`].

mod calculation_result;
mod case_config;
mod child;
mod inputs;
mod parent;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResults, ChildResult, CostBracketInfo,
    MultiCaseChildBreakdown, Payer, PayerRole, PeriodicAmounts, RateApplied, RateParties,
    ZeroPaymentReason,
};
pub use case_config::{CarerCount, CaseConfiguration, Formula};
pub use child::{ADULT_AGE, AgeCohort, CarePeriod, ChildCareArrangement, OLDER_COHORT_AGE};
pub use inputs::CalculatorInputs;
pub use parent::{OtherCaseChild, Parent, ParentFinancials, ParentInput, RelevantDependents};
