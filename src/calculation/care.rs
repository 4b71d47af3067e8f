//! Care conversion.
//!
//! Raw care amounts (nights per week, fortnight or year, or a percentage)
//! are converted to a percentage of the period, rounded to a whole
//! percentage and mapped to a cost percentage for every participating party.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{CarePeriod, CarerCount, ChildCareArrangement, Parent};

use super::cost_percentage;

/// One party's care of one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareShare {
    /// Care as a percentage of the period, unrounded.
    pub percentage: Decimal,
    /// Care rounded to a whole percentage.
    pub rounded: u8,
    /// Cost percentage derived from the rounded care.
    pub cost_percentage: u8,
}

impl CareShare {
    /// Builds a share from a raw care amount.
    pub fn from_amount(amount: Decimal, period: CarePeriod) -> Self {
        let percentage = convert_care_to_percentage(amount, period);
        let rounded = round_care_percentage(percentage);
        Self {
            percentage,
            rounded,
            cost_percentage: cost_percentage(rounded),
        }
    }
}

/// Care shares of every participating party for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildCare {
    /// Parent A's share.
    pub parent_a: CareShare,
    /// Parent B's share.
    pub parent_b: CareShare,
    /// The first carer's share, when carers participate.
    pub npc: Option<CareShare>,
    /// The second carer's share, when two carers participate.
    pub npc2: Option<CareShare>,
}

impl ChildCare {
    /// Returns one parent's share.
    pub fn parent(&self, parent: Parent) -> &CareShare {
        match parent {
            Parent::ParentA => &self.parent_a,
            Parent::ParentB => &self.parent_b,
        }
    }
}

/// Converts a raw care amount to a percentage of the care period.
///
/// # Examples
///
/// ```
/// use child_support_engine::calculation::convert_care_to_percentage;
/// use child_support_engine::models::CarePeriod;
/// use rust_decimal::Decimal;
///
/// assert_eq!(
///     convert_care_to_percentage(Decimal::from(7), CarePeriod::Fortnight),
///     Decimal::from(50)
/// );
/// assert_eq!(
///     convert_care_to_percentage(Decimal::from(35), CarePeriod::Percent),
///     Decimal::from(35)
/// );
/// ```
pub fn convert_care_to_percentage(amount: Decimal, period: CarePeriod) -> Decimal {
    match period {
        CarePeriod::Percent => amount,
        _ => amount / period.maximum() * Decimal::ONE_HUNDRED,
    }
}

/// Rounds a care percentage to a whole percentage.
///
/// Below 50 rounds down; 50 and above rounds up. The result is clamped to
/// the range 0 to 100.
///
/// # Examples
///
/// ```
/// use child_support_engine::calculation::round_care_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_care_percentage(Decimal::new(4999, 2)), 49);
/// assert_eq!(round_care_percentage(Decimal::new(5001, 2)), 51);
/// ```
pub fn round_care_percentage(percentage: Decimal) -> u8 {
    let rounded = if percentage < Decimal::from(50) {
        percentage.floor()
    } else {
        percentage.ceil()
    };
    rounded
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .to_u8()
        .unwrap_or(0)
}

/// Resolves every party's care of a child.
///
/// Carer amounts are only read for the carers that participate in the case.
/// A participating carer with no recorded care has a zero share.
pub fn resolve_child_care(child: &ChildCareArrangement, carers: Option<CarerCount>) -> ChildCare {
    let share = |amount: Decimal| CareShare::from_amount(amount, child.care_period);
    let carer_amount = |amount: Option<Decimal>| amount.unwrap_or(Decimal::ZERO);

    let (npc, npc2) = match carers {
        None => (None, None),
        Some(CarerCount::One) => (Some(share(carer_amount(child.care_amount_npc))), None),
        Some(CarerCount::Two) => (
            Some(share(carer_amount(child.care_amount_npc))),
            Some(share(carer_amount(child.care_amount_npc2))),
        ),
    };

    ChildCare {
        parent_a: share(child.care_amount_a),
        parent_b: share(child.care_amount_b),
        npc,
        npc2,
    }
}
