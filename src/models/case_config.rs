//! Case configuration and formula selection.
//!
//! The six assessment formulas are modelled as the [`Formula`] enum. A
//! [`CaseConfiguration`] maps onto exactly one variant, or is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Parent;

/// Flags describing the shape of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseConfiguration {
    /// A non-parent carer is part of the case.
    #[serde(default)]
    pub has_npc: bool,
    /// A second non-parent carer is part of the case.
    #[serde(default)]
    pub has_second_npc: bool,
    /// Parent A has children in other cases.
    #[serde(default)]
    pub has_multi_case_a: bool,
    /// Parent B has children in other cases.
    #[serde(default)]
    pub has_multi_case_b: bool,
    /// One parent lives overseas in a non-reciprocating jurisdiction.
    #[serde(default)]
    pub has_overseas_parent: bool,
    /// One parent has died.
    #[serde(default)]
    pub has_deceased_parent: bool,
    /// The overseas or deceased parent. Ignored by the other formulas.
    #[serde(default = "default_unavailable_parent")]
    pub unavailable_parent: Parent,
}

fn default_unavailable_parent() -> Parent {
    Parent::ParentB
}

impl Default for CaseConfiguration {
    fn default() -> Self {
        Self {
            has_npc: false,
            has_second_npc: false,
            has_multi_case_a: false,
            has_multi_case_b: false,
            has_overseas_parent: false,
            has_deceased_parent: false,
            unavailable_parent: default_unavailable_parent(),
        }
    }
}

impl CaseConfiguration {
    /// Whether the given parent has children in other cases.
    pub fn has_multi_case(&self, parent: Parent) -> bool {
        match parent {
            Parent::ParentA => self.has_multi_case_a,
            Parent::ParentB => self.has_multi_case_b,
        }
    }
}

/// How many non-parent carers participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarerCount {
    /// A single carer.
    One,
    /// Two carers.
    Two,
}

/// The statutory assessment formula in force for a case.
///
/// # Example
///
/// ```
/// use child_support_engine::models::{CaseConfiguration, Formula};
///
/// let config = CaseConfiguration {
///     has_multi_case_a: true,
///     ..CaseConfiguration::default()
/// };
/// let formula = Formula::from_case_configuration(&config).unwrap();
/// assert_eq!(formula, Formula::MultiCase);
/// assert_eq!(formula.number(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// Formula 1: two parents, single case.
    Standard,
    /// Formula 2: one or two non-parent carers.
    NonParentCarer {
        /// Number of carers.
        carers: CarerCount,
    },
    /// Formula 3: a parent has children in other cases.
    MultiCase,
    /// Formula 4: multi-case with non-parent carers.
    MultiCaseWithCarer {
        /// Number of carers.
        carers: CarerCount,
    },
    /// Formula 5: the absent parent is overseas in a non-reciprocating jurisdiction.
    OverseasParent {
        /// The parent whose income cannot be assessed.
        absent: Parent,
        /// Number of carers.
        carers: CarerCount,
    },
    /// Formula 6: the absent parent has died.
    DeceasedParent {
        /// The deceased parent.
        absent: Parent,
        /// Number of carers.
        carers: CarerCount,
    },
}

impl Formula {
    /// Selects the formula for a case configuration.
    ///
    /// Rejects flag combinations that do not describe a single formula.
    pub fn from_case_configuration(config: &CaseConfiguration) -> EngineResult<Self> {
        if config.has_second_npc && !config.has_npc {
            return Err(EngineError::invalid(
                "case_configuration.has_second_npc",
                "a second non-parent carer requires has_npc",
            ));
        }
        if config.has_overseas_parent && config.has_deceased_parent {
            return Err(EngineError::invalid(
                "case_configuration.has_overseas_parent",
                "overseas and deceased parent formulas are mutually exclusive",
            ));
        }

        let carers = match (config.has_npc, config.has_second_npc) {
            (true, true) => Some(CarerCount::Two),
            (true, false) => Some(CarerCount::One),
            _ => None,
        };
        let multi_case = config.has_multi_case_a || config.has_multi_case_b;
        let absent = config.unavailable_parent;

        if config.has_deceased_parent || config.has_overseas_parent {
            let Some(carers) = carers else {
                return Err(EngineError::invalid(
                    "case_configuration.has_npc",
                    "overseas and deceased parent formulas require a non-parent carer",
                ));
            };
            return Ok(if config.has_deceased_parent {
                Formula::DeceasedParent { absent, carers }
            } else {
                Formula::OverseasParent { absent, carers }
            });
        }

        Ok(match (carers, multi_case) {
            (Some(carers), true) => Formula::MultiCaseWithCarer { carers },
            (Some(carers), false) => Formula::NonParentCarer { carers },
            (None, true) => Formula::MultiCase,
            (None, false) => Formula::Standard,
        })
    }

    /// The statutory formula number (1 to 6).
    pub fn number(&self) -> u8 {
        match self {
            Formula::Standard => 1,
            Formula::NonParentCarer { .. } => 2,
            Formula::MultiCase => 3,
            Formula::MultiCaseWithCarer { .. } => 4,
            Formula::OverseasParent { .. } => 5,
            Formula::DeceasedParent { .. } => 6,
        }
    }

    /// A human-readable formula name.
    pub fn name(&self) -> &'static str {
        match self {
            Formula::Standard => "Standard",
            Formula::NonParentCarer { .. } => "Non-parent carer",
            Formula::MultiCase => "Multi-case",
            Formula::MultiCaseWithCarer { .. } => "Multi-case with non-parent carer",
            Formula::OverseasParent { .. } => "Overseas parent",
            Formula::DeceasedParent { .. } => "Deceased parent",
        }
    }

    /// Number of participating carers, if any.
    pub fn carers(&self) -> Option<CarerCount> {
        match self {
            Formula::Standard | Formula::MultiCase => None,
            Formula::NonParentCarer { carers }
            | Formula::MultiCaseWithCarer { carers }
            | Formula::OverseasParent { carers, .. }
            | Formula::DeceasedParent { carers, .. } => Some(*carers),
        }
    }
}
