//! Parent models.
//!
//! This module contains the per-parent inputs and the derived
//! [`ParentFinancials`] that produce each parent's child support income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the two parents in a case.
///
/// # Example
///
/// ```
/// use child_support_engine::models::Parent;
///
/// assert_eq!(Parent::ParentA.other(), Parent::ParentB);
/// assert_eq!(Parent::ParentB.to_string(), "Parent B");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    /// The first parent.
    ParentA,
    /// The second parent.
    ParentB,
}

impl Parent {
    /// Returns the other parent.
    pub fn other(self) -> Self {
        match self {
            Parent::ParentA => Parent::ParentB,
            Parent::ParentB => Parent::ParentA,
        }
    }

    /// Field-path prefix used in validation messages.
    pub fn field_prefix(self) -> &'static str {
        match self {
            Parent::ParentA => "parent_a",
            Parent::ParentB => "parent_b",
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::ParentA => write!(f, "Parent A"),
            Parent::ParentB => write!(f, "Parent B"),
        }
    }
}

/// Counts of a parent's relevant dependent children.
///
/// Relevant dependents live with the parent but are not part of any child
/// support case. They reduce the parent's child support income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantDependents {
    /// Dependents aged 0 to 12.
    #[serde(default)]
    pub under_13: u32,
    /// Dependents aged 13 or over.
    #[serde(default)]
    pub thirteen_plus: u32,
}

impl RelevantDependents {
    /// Returns true when there are no relevant dependents.
    pub fn is_empty(&self) -> bool {
        self.under_13 == 0 && self.thirteen_plus == 0
    }
}

/// A child of the parent who belongs to a different child support case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherCaseChild {
    /// Age of the child in years.
    pub age: u8,
    /// Identifier of the other case; children sharing an ID share a case.
    /// Children without an ID are each treated as a separate case.
    #[serde(default)]
    pub case_id: Option<String>,
}

/// Income and case facts supplied for one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInput {
    /// Adjusted taxable income for the year.
    pub adjusted_taxable_income: Decimal,
    /// Whether the parent receives an income support payment.
    #[serde(default)]
    pub receives_income_support: bool,
    /// Relevant dependent children living with the parent.
    #[serde(default)]
    pub relevant_dependents: RelevantDependents,
    /// Children of this parent in other child support cases.
    #[serde(default)]
    pub other_case_children: Vec<OtherCaseChild>,
}

impl ParentInput {
    /// Creates a parent with only an income and no other circumstances.
    pub fn with_income(adjusted_taxable_income: Decimal) -> Self {
        Self {
            adjusted_taxable_income,
            receives_income_support: false,
            relevant_dependents: RelevantDependents::default(),
            other_case_children: Vec::new(),
        }
    }
}

/// The amounts that turn adjusted taxable income into child support income.
///
/// Immutable for the duration of a calculation.
///
/// # Example
///
/// ```
/// use child_support_engine::models::ParentFinancials;
/// use rust_decimal::Decimal;
///
/// let financials = ParentFinancials {
///     adjusted_taxable_income: Decimal::from(60000),
///     self_support_amount: Decimal::from(35168),
///     relevant_dependent_allowance: Decimal::ZERO,
///     multi_case_allowance: Decimal::ZERO,
/// };
/// assert_eq!(financials.child_support_income(), Decimal::from(24832));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentFinancials {
    /// Adjusted taxable income (ATI).
    pub adjusted_taxable_income: Decimal,
    /// Self-support amount (SSA) for the year.
    pub self_support_amount: Decimal,
    /// Allowance for relevant dependent children.
    pub relevant_dependent_allowance: Decimal,
    /// Allowance for children in the parent's other cases.
    pub multi_case_allowance: Decimal,
}

impl ParentFinancials {
    /// `max(0, ATI − SSA)`, the income other-case children are costed at.
    pub fn income_above_self_support(&self) -> Decimal {
        (self.adjusted_taxable_income - self.self_support_amount).max(Decimal::ZERO)
    }

    /// Income after self-support and relevant dependents, before the
    /// multi-case allowance. Never negative.
    pub fn preliminary_income(&self) -> Decimal {
        (self.adjusted_taxable_income - self.self_support_amount - self.relevant_dependent_allowance)
            .max(Decimal::ZERO)
    }

    /// Child support income (CSI). Never negative.
    pub fn child_support_income(&self) -> Decimal {
        (self.adjusted_taxable_income
            - self.self_support_amount
            - self.relevant_dependent_allowance
            - self.multi_case_allowance)
            .max(Decimal::ZERO)
    }
}
