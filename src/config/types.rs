//! Configuration types for child support assessment.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the legislative scheme the rates implement.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeMetadata {
    /// Short code for the scheme (e.g., "CSAA-1989").
    pub code: String,
    /// The human-readable name of the governing Act.
    pub name: String,
    /// The version or effective date of the configuration set.
    pub version: String,
    /// URL to the official guide.
    pub source_url: String,
}

/// One row of a progressive cost-of-children table.
///
/// Cost within the row is `fixed + rate × (income − min_income)`. The last
/// row of every table is open-ended and has a zero rate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CostBracket {
    /// Income at which the bracket starts.
    pub min_income: Decimal,
    /// Inclusive upper income bound; `None` for the open-ended top bracket.
    #[serde(default)]
    pub max_income: Option<Decimal>,
    /// Cost accumulated by the brackets below this one.
    pub fixed: Decimal,
    /// Marginal rate applied to income inside the bracket.
    pub rate: Decimal,
}

/// Bracket tables for a single age cohort, keyed by number of children.
#[derive(Debug, Clone, Deserialize)]
pub struct CohortTables {
    /// Table for one child.
    pub one_child: Vec<CostBracket>,
    /// Table for two children.
    pub two_children: Vec<CostBracket>,
    /// Table for three or more children.
    pub three_plus_children: Vec<CostBracket>,
}

/// Bracket tables used when a case has children in both age cohorts.
#[derive(Debug, Clone, Deserialize)]
pub struct MixedAgeTables {
    /// Table for two children.
    pub two_children: Vec<CostBracket>,
    /// Table for three or more children.
    pub three_plus_children: Vec<CostBracket>,
}

/// Which cost-of-children table a lookup used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTableKind {
    /// Every assessable child is under 13.
    Under13,
    /// Every assessable child is 13 or over.
    ThirteenPlus,
    /// Children in both cohorts.
    Mixed,
}

/// The full set of cost-of-children tables for one year.
#[derive(Debug, Clone, Deserialize)]
pub struct CostOfChildrenTables {
    /// Tables for children aged 0 to 12.
    pub under_13: CohortTables,
    /// Tables for children aged 13 to 17.
    pub thirteen_plus: CohortTables,
    /// Tables for a mix of both cohorts.
    pub mixed: MixedAgeTables,
}

impl CostOfChildrenTables {
    /// Returns the bracket rows for a table kind and child count.
    ///
    /// Counts above three use the three-or-more table. A mixed lookup with a
    /// single child falls back to the under-13 table since one child cannot
    /// span both cohorts.
    pub fn brackets(&self, kind: CostTableKind, children: usize) -> &[CostBracket] {
        match (kind, children) {
            (CostTableKind::Under13, 0 | 1) | (CostTableKind::Mixed, 0 | 1) => {
                &self.under_13.one_child
            }
            (CostTableKind::Under13, 2) => &self.under_13.two_children,
            (CostTableKind::Under13, _) => &self.under_13.three_plus_children,
            (CostTableKind::ThirteenPlus, 0 | 1) => &self.thirteen_plus.one_child,
            (CostTableKind::ThirteenPlus, 2) => &self.thirteen_plus.two_children,
            (CostTableKind::ThirteenPlus, _) => &self.thirteen_plus.three_plus_children,
            (CostTableKind::Mixed, 2) => &self.mixed.two_children,
            (CostTableKind::Mixed, _) => &self.mixed.three_plus_children,
        }
    }

    /// Checks every table is non-empty, ascending and ends open-ended.
    pub(crate) fn validate(&self, path: &str) -> EngineResult<()> {
        let tables: [(&str, &[CostBracket]); 8] = [
            ("under_13.one_child", &self.under_13.one_child),
            ("under_13.two_children", &self.under_13.two_children),
            ("under_13.three_plus_children", &self.under_13.three_plus_children),
            ("thirteen_plus.one_child", &self.thirteen_plus.one_child),
            ("thirteen_plus.two_children", &self.thirteen_plus.two_children),
            (
                "thirteen_plus.three_plus_children",
                &self.thirteen_plus.three_plus_children,
            ),
            ("mixed.two_children", &self.mixed.two_children),
            ("mixed.three_plus_children", &self.mixed.three_plus_children),
        ];

        for (name, brackets) in tables {
            let invalid = |message: String| EngineError::ConfigInvalid {
                path: path.to_string(),
                message: format!("{}: {}", name, message),
            };

            let Some(last) = brackets.last() else {
                return Err(invalid("table has no brackets".to_string()));
            };
            if last.max_income.is_some() {
                return Err(invalid("final bracket must be open-ended".to_string()));
            }
            for pair in brackets.windows(2) {
                match pair[0].max_income {
                    Some(max) if max > pair[1].min_income => {
                        return Err(invalid(format!(
                            "bracket ending at {} overlaps bracket starting at {}",
                            max, pair[1].min_income
                        )));
                    }
                    Some(_) => {}
                    None => {
                        return Err(invalid(
                            "only the final bracket may be open-ended".to_string(),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Rate configuration for a specific effective date.
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    /// The effective date for these rates.
    pub effective_date: NaiveDate,
    /// Self-support amount deducted from each parent's income.
    pub self_support_amount: Decimal,
    /// Annual fixed rate per child.
    pub fixed_annual_rate: Decimal,
    /// Annual minimum rate per case.
    pub minimum_annual_rate: Decimal,
    /// Maximum annual Parenting Payment (single); the FAR income threshold.
    pub max_parenting_payment_single: Decimal,
    /// Cost-of-children bracket tables.
    pub cost_of_children: CostOfChildrenTables,
}

/// The complete scheme configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct SchemeConfig {
    /// Scheme metadata.
    metadata: SchemeMetadata,
    /// Rate configurations by effective date (sorted oldest first).
    rates: Vec<RateConfig>,
}

impl SchemeConfig {
    /// Creates a new SchemeConfig from its component parts.
    pub fn new(metadata: SchemeMetadata, rates: Vec<RateConfig>) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            rates: sorted_rates,
        }
    }

    /// Returns the scheme metadata.
    pub fn metadata(&self) -> &SchemeMetadata {
        &self.metadata
    }

    /// Returns all rate configurations.
    pub fn rates(&self) -> &[RateConfig] {
        &self.rates
    }

    /// Finds the most recent rate configuration effective on or before `date`.
    pub fn rates_for(&self, date: NaiveDate) -> EngineResult<&RateConfig> {
        self.rates
            .iter()
            .rev()
            .find(|rc| rc.effective_date <= date)
            .ok_or(EngineError::RatesNotFound { date })
    }
}
