//! Request types for the child support engine API.

use serde::{Deserialize, Serialize};

use crate::models::{CalculatorInputs, CaseConfiguration};

/// Request body for the `/calculate` endpoint.
///
/// `case_configuration` may be omitted for a standard two-parent case.
///
/// # Example
///
/// ```
/// use child_support_engine::api::CalculationRequest;
///
/// let request: CalculationRequest = serde_json::from_str(r#"{
///     "inputs": {
///         "assessment_date": "2026-03-01",
///         "parent_a": { "adjusted_taxable_income": "80000" },
///         "parent_b": { "adjusted_taxable_income": "60000" },
///         "children": [
///             { "age": 10, "care_amount_a": "0", "care_amount_b": "14", "care_period": "fortnight" }
///         ]
///     }
/// }"#).unwrap();
/// assert!(!request.case_configuration.has_npc);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Parents, children and care.
    pub inputs: CalculatorInputs,
    /// Flags selecting the formula.
    #[serde(default)]
    pub case_configuration: CaseConfiguration,
}
