//! The immutable input snapshot for a calculation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ChildCareArrangement, Parent, ParentInput};

/// Everything the engine needs about the parents and children of a case.
///
/// Paired with a [`CaseConfiguration`](super::CaseConfiguration) this forms
/// the complete input to [`compute`](crate::calculation::compute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorInputs {
    /// Date used to select the year's rates.
    pub assessment_date: NaiveDate,
    /// Parent A's circumstances.
    pub parent_a: ParentInput,
    /// Parent B's circumstances.
    pub parent_b: ParentInput,
    /// Children in the case, in display order.
    pub children: Vec<ChildCareArrangement>,
}

impl CalculatorInputs {
    /// Returns the inputs for one parent.
    pub fn parent(&self, parent: Parent) -> &ParentInput {
        match parent {
            Parent::ParentA => &self.parent_a,
            Parent::ParentB => &self.parent_b,
        }
    }
}
