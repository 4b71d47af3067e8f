//! Input validation.
//!
//! Every check runs before any calculation, so a rejected request never
//! yields a partial result.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{CalculatorInputs, CarerCount, CaseConfiguration, Formula, Parent};

/// Oldest age accepted for a child.
pub const MAX_CHILD_AGE: u8 = 25;

/// Largest adjusted taxable income accepted, in dollars.
pub const MAX_ADJUSTED_TAXABLE_INCOME: u64 = 1_000_000_000;

/// Checks inputs against the selected formula.
pub fn validate_inputs(
    inputs: &CalculatorInputs,
    case_config: &CaseConfiguration,
    formula: Formula,
) -> EngineResult<()> {
    let absent = match formula {
        Formula::OverseasParent { absent, .. } | Formula::DeceasedParent { absent, .. } => {
            Some(absent)
        }
        _ => None,
    };

    for parent in [Parent::ParentA, Parent::ParentB] {
        validate_parent(inputs, case_config, parent, absent == Some(parent))?;
    }

    if inputs.children.is_empty() {
        return Err(EngineError::invalid(
            "inputs.children",
            "at least one child is required",
        ));
    }

    let carers = formula.carers();
    for (i, child) in inputs.children.iter().enumerate() {
        let field = |name: &str| format!("inputs.children[{}].{}", i, name);

        if child.age > MAX_CHILD_AGE {
            return Err(EngineError::invalid(
                field("age"),
                format!("age {} exceeds the maximum of {}", child.age, MAX_CHILD_AGE),
            ));
        }

        let mut active = vec![
            ("care_amount_a", Some(child.care_amount_a)),
            ("care_amount_b", Some(child.care_amount_b)),
        ];
        if carers.is_some() {
            active.push(("care_amount_npc", child.care_amount_npc));
        }
        if carers == Some(CarerCount::Two) {
            active.push(("care_amount_npc2", child.care_amount_npc2));
        }

        let mut total = Decimal::ZERO;
        for (name, amount) in active {
            let amount = amount.unwrap_or(Decimal::ZERO);
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid(field(name), "care cannot be negative"));
            }
            total = total.saturating_add(amount);
        }

        let maximum = child.care_period.maximum();
        if total > maximum {
            return Err(EngineError::invalid(
                format!("inputs.children[{}]", i),
                format!(
                    "care amounts total {} but the period allows at most {}",
                    total.normalize(),
                    maximum
                ),
            ));
        }

        if let Some(absent) = absent {
            let absent_care = match absent {
                Parent::ParentA => child.care_amount_a,
                Parent::ParentB => child.care_amount_b,
            };
            if !absent_care.is_zero() {
                return Err(EngineError::invalid(
                    field(&format!("care_amount_{}", suffix(absent))),
                    format!("{} is unavailable and cannot provide care", absent),
                ));
            }
        }
    }

    Ok(())
}

fn suffix(parent: Parent) -> &'static str {
    match parent {
        Parent::ParentA => "a",
        Parent::ParentB => "b",
    }
}

fn validate_parent(
    inputs: &CalculatorInputs,
    case_config: &CaseConfiguration,
    parent: Parent,
    absent: bool,
) -> EngineResult<()> {
    let input = inputs.parent(parent);
    let prefix = format!("inputs.{}", parent.field_prefix());

    if input.adjusted_taxable_income < Decimal::ZERO {
        return Err(EngineError::invalid(
            format!("{}.adjusted_taxable_income", prefix),
            "adjusted taxable income cannot be negative",
        ));
    }
    if input.adjusted_taxable_income > Decimal::from(MAX_ADJUSTED_TAXABLE_INCOME) {
        return Err(EngineError::invalid(
            format!("{}.adjusted_taxable_income", prefix),
            format!(
                "adjusted taxable income exceeds the maximum of {}",
                MAX_ADJUSTED_TAXABLE_INCOME
            ),
        ));
    }

    for (j, child) in input.other_case_children.iter().enumerate() {
        if child.age > MAX_CHILD_AGE {
            return Err(EngineError::invalid(
                format!("{}.other_case_children[{}].age", prefix, j),
                format!("age {} exceeds the maximum of {}", child.age, MAX_CHILD_AGE),
            ));
        }
    }

    if !absent && case_config.has_multi_case(parent) && input.other_case_children.is_empty() {
        return Err(EngineError::invalid(
            format!("case_configuration.has_multi_case_{}", suffix(parent)),
            format!("{} is flagged as multi-case but has no other-case children", parent),
        ));
    }

    Ok(())
}
