//! Child care arrangement models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Age from which a child is no longer assessable under the standard formula.
pub const ADULT_AGE: u8 = 18;

/// Age at which children move into the older cost cohort.
pub const OLDER_COHORT_AGE: u8 = 13;

/// The unit in which care amounts are expressed.
///
/// # Example
///
/// ```
/// use child_support_engine::models::CarePeriod;
/// use rust_decimal::Decimal;
///
/// assert_eq!(CarePeriod::Fortnight.maximum(), Decimal::from(14));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarePeriod {
    /// Nights per week.
    Week,
    /// Nights per fortnight.
    Fortnight,
    /// Nights per year.
    Year,
    /// Percentage of care.
    Percent,
}

impl CarePeriod {
    /// Largest total care amount the period can hold.
    pub fn maximum(self) -> Decimal {
        match self {
            CarePeriod::Week => Decimal::from(7),
            CarePeriod::Fortnight => Decimal::from(14),
            CarePeriod::Year => Decimal::from(365),
            CarePeriod::Percent => Decimal::ONE_HUNDRED,
        }
    }
}

/// Age cohort used to pick a cost-of-children table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCohort {
    /// Aged 0 to 12.
    Under13,
    /// Aged 13 to 17.
    ThirteenPlus,
    /// Aged 18 or over; excluded from the standard formula.
    Adult,
}

impl AgeCohort {
    /// Classifies an age.
    pub fn from_age(age: u8) -> Self {
        if age >= ADULT_AGE {
            AgeCohort::Adult
        } else if age >= OLDER_COHORT_AGE {
            AgeCohort::ThirteenPlus
        } else {
            AgeCohort::Under13
        }
    }
}

/// Care arrangement for one child in the case.
///
/// Care amounts for every carer are expressed in the same `care_period`.
/// Their sum must not exceed the period's maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCareArrangement {
    /// Age of the child in years.
    pub age: u8,
    /// Treat the child as an adult regardless of age.
    #[serde(default)]
    pub is_adult_child: bool,
    /// Care provided by Parent A.
    pub care_amount_a: Decimal,
    /// Care provided by Parent B.
    pub care_amount_b: Decimal,
    /// Care provided by the first non-parent carer.
    #[serde(default)]
    pub care_amount_npc: Option<Decimal>,
    /// Care provided by the second non-parent carer.
    #[serde(default)]
    pub care_amount_npc2: Option<Decimal>,
    /// Unit of the care amounts.
    pub care_period: CarePeriod,
}

impl ChildCareArrangement {
    /// Whether the child is excluded from the standard per-child formula.
    pub fn is_adult(&self) -> bool {
        self.is_adult_child || self.age >= ADULT_AGE
    }

    /// Whether the child turns 18 within the coming year.
    pub fn is_turning_18(&self) -> bool {
        !self.is_adult() && self.age == ADULT_AGE - 1
    }

    /// Cohort of the child, honouring the adult flag.
    pub fn cohort(&self) -> AgeCohort {
        if self.is_adult_child {
            AgeCohort::Adult
        } else {
            AgeCohort::from_age(self.age)
        }
    }
}
