//! Calculation result models for the child support engine.
//!
//! This module contains the [`CalculationResults`] type and its associated
//! structures: per-child facts, payment lines, multi-case breakdowns and the
//! audit trace. Results are built once at the end of a calculation and are
//! never modified afterwards.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AgeCohort, Parent, ParentFinancials};
use crate::config::CostTableKind;

/// The resolved row of a progressive cost-of-children table.
///
/// # Example
///
/// ```
/// use child_support_engine::models::CostBracketInfo;
/// use rust_decimal::Decimal;
///
/// let info = CostBracketInfo {
///     min_income: Decimal::from(46569),
///     max_income: Some(Decimal::from(93137)),
///     fixed: Decimal::from(7917),
///     rate: Decimal::new(15, 2),
///     income_in_bracket: Decimal::from(31339),
/// };
/// assert_eq!(info.fixed + info.rate * info.income_in_bracket, Decimal::new(1261785, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBracketInfo {
    /// Income at which the bracket starts.
    pub min_income: Decimal,
    /// Upper bound of the bracket; absent for the top bracket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_income: Option<Decimal>,
    /// Cost accumulated below the bracket.
    pub fixed: Decimal,
    /// Marginal rate inside the bracket.
    pub rate: Decimal,
    /// Portion of income falling inside the bracket.
    pub income_in_bracket: Decimal,
}

/// Computed facts for one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildResult {
    /// Age of the child.
    pub age: u8,
    /// Cost cohort of the child.
    pub age_cohort: AgeCohort,
    /// Excluded from the standard formula as an adult child.
    pub is_adult_child: bool,
    /// Aged 17; advisory only.
    pub is_turning_18: bool,
    /// Parent A's care before rounding.
    pub care_a: Decimal,
    /// Parent B's care before rounding.
    pub care_b: Decimal,
    /// First carer's care before rounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_npc: Option<Decimal>,
    /// Second carer's care before rounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_npc2: Option<Decimal>,
    /// Parent A's rounded care percentage.
    pub rounded_care_a: u8,
    /// Parent B's rounded care percentage.
    pub rounded_care_b: u8,
    /// First carer's rounded care percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounded_care_npc: Option<u8>,
    /// Second carer's rounded care percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounded_care_npc2: Option<u8>,
    /// Parent A's cost percentage.
    pub cost_perc_a: u8,
    /// Parent B's cost percentage.
    pub cost_perc_b: u8,
    /// First carer's cost percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_perc_npc: Option<u8>,
    /// Second carer's cost percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_perc_npc2: Option<u8>,
    /// Parent A's child support percentage; never negative.
    pub child_support_perc_a: Decimal,
    /// Parent B's child support percentage; never negative.
    pub child_support_perc_b: Decimal,
    /// Cost of this child.
    pub cost_per_child: Decimal,
    /// Parent A's liability from the percentage formula, before caps,
    /// rate overrides and payee eligibility.
    pub liability_a: Decimal,
    /// Parent B's liability from the percentage formula.
    pub liability_b: Decimal,
    /// Amount Parent A pays Parent B for this child.
    pub final_liability_a: Decimal,
    /// Amount Parent B pays Parent A for this child.
    pub final_liability_b: Decimal,
    /// Amount Parent A pays carers for this child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liability_to_npc_a: Option<Decimal>,
    /// Amount Parent B pays carers for this child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liability_to_npc_b: Option<Decimal>,
    /// Parent A's multi-case cap for this child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_cap_a: Option<Decimal>,
    /// Parent B's multi-case cap for this child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_cap_b: Option<Decimal>,
    /// Parent A's liability was reduced to the multi-case cap.
    pub multi_case_cap_applied_a: bool,
    /// Parent B's liability was reduced to the multi-case cap.
    pub multi_case_cap_applied_b: bool,
    /// Parent A pays the fixed annual rate for this child.
    pub far_applied_a: bool,
    /// Parent B pays the fixed annual rate for this child.
    pub far_applied_b: bool,
    /// Parent A's minimum annual rate is allocated to this child.
    pub mar_applied_a: bool,
    /// Parent B's minimum annual rate is allocated to this child.
    pub mar_applied_b: bool,
    /// Bracket used for the cost of this child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_bracket_info: Option<CostBracketInfo>,
}

/// One child in a parent's multi-case cost breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiCaseChildBreakdown {
    /// Age of the child.
    pub child_age: u8,
    /// Whether the child belongs to the case being assessed.
    pub is_current_case: bool,
    /// Notional cost of the child with all the parent's children treated
    /// as the same age.
    pub cost_per_child: Decimal,
}

/// Which side of the parent-to-parent line pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payer {
    /// Parent A.
    ParentA,
    /// Parent B.
    ParentB,
    /// Nobody.
    Neither,
}

impl From<Parent> for Payer {
    fn from(parent: Parent) -> Self {
        match parent {
            Parent::ParentA => Payer::ParentA,
            Parent::ParentB => Payer::ParentB,
        }
    }
}

impl fmt::Display for Payer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payer::ParentA => write!(f, "Parent A"),
            Payer::ParentB => write!(f, "Parent B"),
            Payer::Neither => write!(f, "Neither"),
        }
    }
}

/// Parent A's role in the case, counting carer payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerRole {
    /// Parent A pays.
    PayingParent,
    /// Parent B pays.
    ReceivingParent,
    /// Both parents pay carers.
    BothPaying,
    /// Nothing is payable.
    Neither,
}

/// The parents a rate override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateParties {
    /// Parent A only.
    ParentA,
    /// Parent B only.
    ParentB,
    /// Both parents.
    BothParents,
}

impl fmt::Display for RateParties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateParties::ParentA => write!(f, "Parent A"),
            RateParties::ParentB => write!(f, "Parent B"),
            RateParties::BothParents => write!(f, "Both Parents"),
        }
    }
}

/// Which flat-rate override, if any, governs the assessment.
///
/// # Example
///
/// ```
/// use child_support_engine::models::{RateApplied, RateParties};
///
/// let rate = RateApplied::Far { parties: RateParties::ParentA, children: 2 };
/// assert_eq!(rate.to_string(), "FAR (Parent A, 2 children)");
/// assert_eq!(RateApplied::None.to_string(), "None");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateApplied {
    /// Percentage formula only.
    None,
    /// Fixed annual rate.
    Far {
        /// Parents paying FAR.
        parties: RateParties,
        /// Children attracting FAR.
        children: u32,
    },
    /// Minimum annual rate.
    Mar {
        /// Parents paying MAR.
        parties: RateParties,
    },
}

impl fmt::Display for RateApplied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateApplied::None => write!(f, "None"),
            RateApplied::Far {
                parties: RateParties::BothParents,
                ..
            } => write!(f, "FAR (Both Parents)"),
            RateApplied::Far { parties, children } => {
                let noun = if *children == 1 { "child" } else { "children" };
                write!(f, "FAR ({}, {} {})", parties, children, noun)
            }
            RateApplied::Mar { parties } => write!(f, "MAR ({})", parties),
        }
    }
}

/// Why an assessment produced no payment at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZeroPaymentReason {
    /// Combined child support income is zero.
    ZeroIncome,
    /// A low-income parent on income support has 14% or more care, so the
    /// minimum annual rate does not apply.
    MarPreventedByCare {
        /// The parent the minimum rate would have applied to.
        parent: Parent,
    },
    /// Neither parent has the 35% care needed to receive payment.
    BothLowCare,
    /// Both child support percentages are effectively zero.
    BalancedPercentages,
    /// A parent has a child support percentage but the other parent is below
    /// the 35% care threshold.
    CareThreshold,
    /// None of the recognised situations matched.
    Unexplained,
}

impl ZeroPaymentReason {
    /// Plain-language explanation of the outcome.
    pub fn explanation(&self) -> String {
        match self {
            ZeroPaymentReason::ZeroIncome => "Neither parent has child support income once the \
                self-support amount and dependant allowances are deducted, so there is nothing \
                to assess."
                .to_string(),
            ZeroPaymentReason::MarPreventedByCare { parent } => format!(
                "{} has a low income and receives income support, but provides at least 14% \
                 care of a child, so the minimum annual rate does not apply.",
                parent
            ),
            ZeroPaymentReason::BothLowCare => "Neither parent has at least 35% care, which is \
                the threshold for receiving child support."
                .to_string(),
            ZeroPaymentReason::BalancedPercentages => "The parents' income shares and cost \
                shares offset each other, leaving neither with a child support percentage."
                .to_string(),
            ZeroPaymentReason::CareThreshold => "A parent has a child support percentage, but \
                the other parent has less than 35% care and cannot receive payment."
                .to_string(),
            ZeroPaymentReason::Unexplained => {
                "No child support is payable under the current income and care arrangements."
                    .to_string()
            }
        }
    }
}

/// An annual amount with its monthly and fortnightly equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicAmounts {
    /// Amount per year.
    pub annual: Decimal,
    /// Amount per month, to the cent.
    pub monthly: Decimal,
    /// Amount per fortnight, to the cent.
    pub fortnightly: Decimal,
}

impl PeriodicAmounts {
    /// Derives monthly and fortnightly figures from an annual amount.
    ///
    /// # Example
    ///
    /// ```
    /// use child_support_engine::models::PeriodicAmounts;
    /// use rust_decimal::Decimal;
    ///
    /// let amounts = PeriodicAmounts::from_annual(Decimal::from(7200));
    /// assert_eq!(amounts.monthly, Decimal::from(600));
    /// assert_eq!(amounts.fortnightly, Decimal::new(27692, 2));
    /// ```
    pub fn from_annual(annual: Decimal) -> Self {
        let to_cents =
            |d: Decimal| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            annual,
            monthly: to_cents(annual / Decimal::from(12)),
            fortnightly: to_cents(annual / Decimal::from(26)),
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Formula step the rule implements.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag advisory conditions that don't prevent calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete result of a child support assessment.
///
/// Optional fields are present only when the matching case configuration is
/// active: carer payments need a non-parent carer, multi-case fields need a
/// multi-case parent, and the cost bracket needs at least one assessable child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResults {
    /// Formula number (1 to 6).
    pub formula_used: u8,
    /// Formula name.
    pub formula_name: String,
    /// Effective date of the rate table used.
    pub rates_effective_date: NaiveDate,
    /// Self-support amount (SSA).
    pub self_support_amount: Decimal,
    /// Fixed annual rate per child (FAR).
    pub fixed_annual_rate: Decimal,
    /// Minimum annual rate per case (MAR).
    pub minimum_annual_rate: Decimal,
    /// FAR income threshold.
    pub max_parenting_payment_single: Decimal,
    /// Parent A's income components.
    pub financials_a: ParentFinancials,
    /// Parent B's income components.
    pub financials_b: ParentFinancials,
    /// Parent A's child support income.
    pub csi_a: Decimal,
    /// Parent B's child support income.
    pub csi_b: Decimal,
    /// Income entering the cost-of-children table: combined CSI, or the
    /// available parent's (doubled) CSI for formulas 5 and 6.
    pub ccsi: Decimal,
    /// Parent A's income percentage.
    pub income_perc_a: Decimal,
    /// Parent B's income percentage.
    pub income_perc_b: Decimal,
    /// Total cost of the assessable children.
    pub total_cost: Decimal,
    /// Table used for the cost of the children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_table: Option<CostTableKind>,
    /// Bracket used for the cost of the children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_bracket_info: Option<CostBracketInfo>,
    /// Per-child results, in input order.
    pub child_results: Vec<ChildResult>,
    /// Parent A's percentage-formula liability across all children.
    pub total_liability_a: Decimal,
    /// Parent B's percentage-formula liability across all children.
    pub total_liability_b: Decimal,
    /// Parent A's payments to Parent B.
    pub final_liability_a: Decimal,
    /// Parent B's payments to Parent A.
    pub final_liability_b: Decimal,
    /// Consolidated fixed annual rate payable by Parent A.
    pub far_a: Decimal,
    /// Consolidated fixed annual rate payable by Parent B.
    pub far_b: Decimal,
    /// Consolidated minimum annual rate payable by Parent A.
    pub mar_a: Decimal,
    /// Consolidated minimum annual rate payable by Parent B.
    pub mar_b: Decimal,
    /// Explanation when Parent A's FAR was limited across cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far_cap_explanation_a: Option<String>,
    /// Explanation when Parent B's FAR was limited across cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far_cap_explanation_b: Option<String>,
    /// Explanation when Parent A's MAR was limited across cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mar_cap_explanation_a: Option<String>,
    /// Explanation when Parent B's MAR was limited across cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mar_cap_explanation_b: Option<String>,
    /// Flat-rate override summary.
    pub rate_applied: RateApplied,
    /// Parent with the larger aggregate liability.
    pub payer: Payer,
    /// Recipient of the net parent-to-parent payment.
    pub receiver: Payer,
    /// Parent A's role, counting carer payments.
    pub payer_role: PayerRole,
    /// Net annual payment between the parents.
    pub final_payment_amount: Decimal,
    /// Net parent-to-parent payment by period.
    pub final_payment: PeriodicAmounts,
    /// Total annual payments to carers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_to_npc: Option<Decimal>,
    /// Annual payments to the first carer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_to_npc1: Option<Decimal>,
    /// Annual payments to the second carer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_to_npc2: Option<Decimal>,
    /// Carer payments by period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_payment: Option<PeriodicAmounts>,
    /// Parent A's multi-case allowance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_allowance_a: Option<Decimal>,
    /// Parent B's multi-case allowance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_allowance_b: Option<Decimal>,
    /// Parent A's same-age cost breakdown across all their cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_breakdown_a: Option<Vec<MultiCaseChildBreakdown>>,
    /// Parent B's same-age cost breakdown across all their cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_case_breakdown_b: Option<Vec<MultiCaseChildBreakdown>>,
    /// A multi-case cap reduced at least one of Parent A's liabilities.
    pub multi_case_cap_applied_a: bool,
    /// A multi-case cap reduced at least one of Parent B's liabilities.
    pub multi_case_cap_applied_b: bool,
    /// Why nothing is payable, when that is the outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_payment_reason: Option<ZeroPaymentReason>,
    /// Record of every decision taken.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_applied_labels() {
        assert_eq!(
            RateApplied::Far {
                parties: RateParties::ParentB,
                children: 1
            }
            .to_string(),
            "FAR (Parent B, 1 child)"
        );
        assert_eq!(
            RateApplied::Far {
                parties: RateParties::BothParents,
                children: 3
            }
            .to_string(),
            "FAR (Both Parents)"
        );
        assert_eq!(
            RateApplied::Mar {
                parties: RateParties::ParentA
            }
            .to_string(),
            "MAR (Parent A)"
        );
    }

    #[test]
    fn test_rate_applied_serializes_tagged() {
        let json = serde_json::to_value(RateApplied::Mar {
            parties: RateParties::BothParents,
        })
        .unwrap();
        assert_eq!(json["kind"], "mar");
        assert_eq!(json["parties"], "both_parents");
    }

    #[test]
    fn test_payer_display() {
        assert_eq!(Payer::from(Parent::ParentB).to_string(), "Parent B");
        assert_eq!(Payer::Neither.to_string(), "Neither");
    }

    #[test]
    fn test_zero_payment_reason_mentions_parent() {
        let reason = ZeroPaymentReason::MarPreventedByCare {
            parent: Parent::ParentA,
        };
        assert!(reason.explanation().contains("Parent A"));
        assert_eq!(
            serde_json::to_value(reason).unwrap()["type"],
            "mar_prevented_by_care"
        );
    }

    #[test]
    fn test_periodic_amounts_round_to_cents() {
        let amounts = PeriodicAmounts::from_annual(Decimal::from(1000));
        assert_eq!(amounts.monthly, Decimal::new(8333, 2));
        assert_eq!(amounts.fortnightly, Decimal::new(3846, 2));
    }

    #[test]
    fn test_bracket_info_omits_open_upper_bound() {
        let info = CostBracketInfo {
            min_income: Decimal::from(232843),
            max_income: None,
            fixed: Decimal::from(28407),
            rate: Decimal::ZERO,
            income_in_bracket: Decimal::from(10),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("max_income"));
    }
}
