//! Formula selection and the assessment pipeline.
//!
//! [`compute`] is the engine's single entry point. It validates the inputs,
//! picks the formula from the case configuration and runs the components of
//! this module in order, recording each decision in the audit trace.
//!
//! Formulas 1 to 4 assess both parents against each other; formulas 5 and 6
//! assess the available parent alone and pay everything to carers.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use crate::config::{RateConfig, SchemeConfig};
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CalculationResults, CalculatorInputs, CarerCount,
    CaseConfiguration, ChildCareArrangement, ChildResult, Formula, Parent, PeriodicAmounts,
    RateApplied, RateParties,
};

use super::{
    ChildCare, ParentIncome, ParentRateOutcome, RECEIVING_CARE_THRESHOLD, Recipient,
    RecipientShare, apply_multi_case_cap, assess_parent_rates, calculate_cost_of_children,
    carer_portion, child_support_percentage, detect_zero_payment, distribute_by_cost,
    distribute_to_highest_care, eligible_recipients, halved_liability, income_percentages,
    mar_prevented_by_care, multi_case_cap, parent_portion, parent_to_parent_payer,
    resolve_child_care, resolve_parent_income, resolve_payment, split_between_carers,
    split_evenly, standard_liability, validate_inputs,
};

/// How the parents are assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assessment {
    /// Both parents, with optional carers.
    TwoParent { carers: Option<CarerCount> },
    /// The available parent only.
    SingleParent {
        absent: Parent,
        carers: CarerCount,
        doubled: bool,
    },
}

impl Assessment {
    fn from_formula(formula: Formula) -> Self {
        match formula {
            Formula::Standard | Formula::MultiCase => Assessment::TwoParent { carers: None },
            Formula::NonParentCarer { carers } | Formula::MultiCaseWithCarer { carers } => {
                Assessment::TwoParent {
                    carers: Some(carers),
                }
            }
            Formula::OverseasParent { absent, carers } => Assessment::SingleParent {
                absent,
                carers,
                doubled: true,
            },
            Formula::DeceasedParent { absent, carers } => Assessment::SingleParent {
                absent,
                carers,
                doubled: false,
            },
        }
    }

    fn carers(self) -> Option<CarerCount> {
        match self {
            Assessment::TwoParent { carers } => carers,
            Assessment::SingleParent { carers, .. } => Some(carers),
        }
    }

    fn is_present(self, parent: Parent) -> bool {
        match self {
            Assessment::TwoParent { .. } => true,
            Assessment::SingleParent { absent, .. } => absent != parent,
        }
    }

    fn is_two_parent(self) -> bool {
        matches!(self, Assessment::TwoParent { .. })
    }
}

/// A value held for each parent.
#[derive(Debug, Clone, Default)]
struct PerParent<T> {
    a: T,
    b: T,
}

impl<T> PerParent<T> {
    fn from_fn(mut f: impl FnMut(Parent) -> T) -> Self {
        Self {
            a: f(Parent::ParentA),
            b: f(Parent::ParentB),
        }
    }

    fn get(&self, parent: Parent) -> &T {
        match parent {
            Parent::ParentA => &self.a,
            Parent::ParentB => &self.b,
        }
    }
}

/// Percentage-formula figures for one assessable child.
#[derive(Debug, Clone)]
struct ChildShares {
    child_support_perc: PerParent<Decimal>,
    liability: PerParent<Decimal>,
    payer: Option<Parent>,
}

/// What one parent pays for one child.
#[derive(Debug, Clone, Default)]
struct ParentLine {
    cap: Option<Decimal>,
    cap_applied: bool,
    far: bool,
    mar: bool,
    unpaid: bool,
    shares: Vec<RecipientShare>,
}

/// Collects audit steps and warnings with sequential numbering.
#[derive(Debug)]
struct AuditLog {
    formula: u8,
    steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

impl AuditLog {
    fn new(formula: u8) -> Self {
        Self {
            formula,
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn step(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        section: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            reference: format!("Formula {}, {}", self.formula, section),
            input,
            output,
            reasoning,
        });
    }

    fn warn(&mut self, code: &str, message: String, severity: &str) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message,
            severity: severity.to_string(),
        });
    }

    fn into_trace(self) -> AuditTrace {
        AuditTrace {
            steps: self.steps,
            warnings: self.warnings,
        }
    }
}

fn text(amount: Decimal) -> String {
    amount.normalize().to_string()
}

fn percent(amount: Decimal) -> String {
    amount.round_dp(2).normalize().to_string()
}

/// Computes a child support assessment.
///
/// # Arguments
///
/// * `inputs` - Incomes, children and care
/// * `case_config` - Flags selecting the formula
/// * `config` - Year-indexed rates; the table effective on
///   `inputs.assessment_date` is used
///
/// # Errors
///
/// Returns [`EngineError::InputValidation`](crate::error::EngineError::InputValidation)
/// for inconsistent flags or invalid inputs, and
/// [`EngineError::RatesNotFound`](crate::error::EngineError::RatesNotFound) when
/// no rates are effective on the assessment date. Nothing is computed in
/// either case.
///
/// # Example
///
/// ```no_run
/// use child_support_engine::calculation::compute;
/// use child_support_engine::config::ConfigLoader;
/// use child_support_engine::models::{
///     CalculatorInputs, CarePeriod, CaseConfiguration, ChildCareArrangement, ParentInput, Payer,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/child_support").unwrap();
/// let inputs = CalculatorInputs {
///     assessment_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     parent_a: ParentInput::with_income(Decimal::from(80000)),
///     parent_b: ParentInput::with_income(Decimal::from(60000)),
///     children: vec![ChildCareArrangement {
///         age: 10,
///         is_adult_child: false,
///         care_amount_a: Decimal::ZERO,
///         care_amount_b: Decimal::from(100),
///         care_amount_npc: None,
///         care_amount_npc2: None,
///         care_period: CarePeriod::Percent,
///     }],
/// };
///
/// let results = compute(&inputs, &CaseConfiguration::default(), loader.config()).unwrap();
/// assert_eq!(results.payer, Payer::ParentA);
/// assert_eq!(results.final_liability_a, Decimal::from(7929));
/// ```
pub fn compute(
    inputs: &CalculatorInputs,
    case_config: &CaseConfiguration,
    config: &SchemeConfig,
) -> EngineResult<CalculationResults> {
    let formula = Formula::from_case_configuration(case_config)?;
    validate_inputs(inputs, case_config, formula)?;
    let rates = config.rates_for(inputs.assessment_date)?;

    debug!(
        formula = formula.number(),
        formula_name = formula.name(),
        rates_effective = %rates.effective_date,
        children = inputs.children.len(),
        "Formula selected"
    );

    let mut audit = AuditLog::new(formula.number());
    audit.step(
        "formula_selection",
        "Formula Selection",
        "selection",
        json!({
            "has_npc": case_config.has_npc,
            "has_second_npc": case_config.has_second_npc,
            "has_multi_case_a": case_config.has_multi_case_a,
            "has_multi_case_b": case_config.has_multi_case_b,
            "has_overseas_parent": case_config.has_overseas_parent,
            "has_deceased_parent": case_config.has_deceased_parent,
            "unavailable_parent": case_config.unavailable_parent,
        }),
        json!({ "formula": formula.number(), "name": formula.name() }),
        format!(
            "The case configuration selects Formula {} ({})",
            formula.number(),
            formula.name()
        ),
    );

    Ok(assess(
        inputs,
        case_config,
        formula,
        Assessment::from_formula(formula),
        rates,
        audit,
    ))
}

fn record_care(audit: &mut AuditLog, index: usize, child: &ChildCareArrangement, care: &ChildCare) {
    let reasoning = if child.is_adult() {
        format!(
            "Child {} is an adult child; care is recorded but the child is not assessed",
            index + 1
        )
    } else {
        format!(
            "Parent A has {}% care (cost {}%), Parent B has {}% care (cost {}%)",
            care.parent_a.rounded,
            care.parent_a.cost_percentage,
            care.parent_b.rounded,
            care.parent_b.cost_percentage
        )
    };
    audit.step(
        "care_conversion",
        "Care Conversion",
        "steps 4 and 5",
        json!({
            "child": index + 1,
            "age": child.age,
            "care_period": child.care_period,
            "care_amount_a": text(child.care_amount_a),
            "care_amount_b": text(child.care_amount_b),
            "care_amount_npc": child.care_amount_npc.map(text),
            "care_amount_npc2": child.care_amount_npc2.map(text),
        }),
        json!({
            "rounded_care_a": care.parent_a.rounded,
            "rounded_care_b": care.parent_b.rounded,
            "rounded_care_npc": care.npc.map(|s| s.rounded),
            "rounded_care_npc2": care.npc2.map(|s| s.rounded),
            "cost_perc_a": care.parent_a.cost_percentage,
            "cost_perc_b": care.parent_b.cost_percentage,
            "cost_perc_npc": care.npc.map(|s| s.cost_percentage),
            "cost_perc_npc2": care.npc2.map(|s| s.cost_percentage),
        }),
        reasoning,
    );
}

fn record_income(audit: &mut AuditLog, parent: Parent, present: bool, income: &ParentIncome) {
    let f = &income.financials;
    let reasoning = if present {
        format!(
            "{}: {} ATI − {} SSA − {} dependants − {} multi-case = {} CSI",
            parent,
            text(f.adjusted_taxable_income),
            text(f.self_support_amount),
            text(f.relevant_dependent_allowance),
            text(f.multi_case_allowance),
            text(f.child_support_income())
        )
    } else {
        format!("{} is unavailable and has no child support income", parent)
    };
    audit.step(
        "child_support_income",
        "Child Support Income",
        "step 1",
        json!({
            "parent": parent,
            "adjusted_taxable_income": text(f.adjusted_taxable_income),
            "self_support_amount": text(f.self_support_amount),
        }),
        json!({
            "relevant_dependent_allowance": text(f.relevant_dependent_allowance),
            "multi_case_allowance": text(f.multi_case_allowance),
            "child_support_income": text(f.child_support_income()),
        }),
        reasoning,
    );

    if let Some(multi_case) = &income.multi_case {
        audit.step(
            "multi_case_allowance",
            "Multi-case Allowance",
            "step 1",
            json!({
                "parent": parent,
                "income_above_self_support": text(f.income_above_self_support()),
                "preliminary_income": text(f.preliminary_income()),
                "total_cases": multi_case.total_cases,
            }),
            json!({
                "allowance": text(multi_case.allowance),
                "breakdown": multi_case.breakdown,
            }),
            format!(
                "{} has {} children in other cases; their same-age cost of {} is allowed",
                parent,
                multi_case.other_children,
                text(multi_case.allowance)
            ),
        );
    }
}

fn record_rates(audit: &mut AuditLog, parent: Parent, outcome: &ParentRateOutcome) {
    let reasoning = if outcome.far_count() > 0 {
        format!(
            "{} pays the fixed annual rate of {} for {} children",
            parent,
            text(outcome.far_per_child),
            outcome.far_count()
        )
    } else if let Some(mar) = outcome.mar {
        format!("{} pays the minimum annual rate of {}", parent, text(mar))
    } else {
        format!("Neither flat rate applies to {}", parent)
    };
    audit.step(
        "annual_rates",
        "Fixed and Minimum Annual Rates",
        "annual rates",
        json!({ "parent": parent }),
        json!({
            "far_children": outcome.far_count(),
            "far_per_child": text(outcome.far_per_child),
            "mar": outcome.mar.map(text),
        }),
        reasoning,
    );

    if let Some(explanation) = &outcome.far_explanation {
        audit.warn("FAR_CHILD_LIMIT", format!("{}: {}", parent, explanation), "low");
    }
    if let Some(explanation) = &outcome.mar_explanation {
        audit.warn("MAR_CASE_LIMIT", format!("{}: {}", parent, explanation), "low");
    }
}

fn adult_child_result(child: &ChildCareArrangement, care: &ChildCare) -> ChildResult {
    ChildResult {
        age: child.age,
        age_cohort: child.cohort(),
        is_adult_child: true,
        is_turning_18: false,
        care_a: care.parent_a.percentage,
        care_b: care.parent_b.percentage,
        care_npc: care.npc.map(|s| s.percentage),
        care_npc2: care.npc2.map(|s| s.percentage),
        rounded_care_a: care.parent_a.rounded,
        rounded_care_b: care.parent_b.rounded,
        rounded_care_npc: care.npc.map(|s| s.rounded),
        rounded_care_npc2: care.npc2.map(|s| s.rounded),
        cost_perc_a: 0,
        cost_perc_b: 0,
        cost_perc_npc: care.npc.map(|_| 0),
        cost_perc_npc2: care.npc2.map(|_| 0),
        child_support_perc_a: Decimal::ZERO,
        child_support_perc_b: Decimal::ZERO,
        cost_per_child: Decimal::ZERO,
        liability_a: Decimal::ZERO,
        liability_b: Decimal::ZERO,
        final_liability_a: Decimal::ZERO,
        final_liability_b: Decimal::ZERO,
        liability_to_npc_a: care.npc.map(|_| Decimal::ZERO),
        liability_to_npc_b: care.npc.map(|_| Decimal::ZERO),
        multi_case_cap_a: None,
        multi_case_cap_b: None,
        multi_case_cap_applied_a: false,
        multi_case_cap_applied_b: false,
        far_applied_a: false,
        far_applied_b: false,
        mar_applied_a: false,
        mar_applied_b: false,
        cost_bracket_info: None,
    }
}

fn rate_parties(a: bool, b: bool) -> Option<RateParties> {
    match (a, b) {
        (true, true) => Some(RateParties::BothParents),
        (true, false) => Some(RateParties::ParentA),
        (false, true) => Some(RateParties::ParentB),
        (false, false) => None,
    }
}

fn assess(
    inputs: &CalculatorInputs,
    case_config: &CaseConfiguration,
    formula: Formula,
    assessment: Assessment,
    rates: &RateConfig,
    mut audit: AuditLog,
) -> CalculationResults {
    audit.step(
        "rates_lookup",
        "Rates Lookup",
        "rates",
        json!({ "assessment_date": inputs.assessment_date.to_string() }),
        json!({
            "effective_date": rates.effective_date.to_string(),
            "self_support_amount": text(rates.self_support_amount),
            "fixed_annual_rate": text(rates.fixed_annual_rate),
            "minimum_annual_rate": text(rates.minimum_annual_rate),
            "max_parenting_payment_single": text(rates.max_parenting_payment_single),
        }),
        format!(
            "Rates effective {} apply to an assessment on {}",
            rates.effective_date, inputs.assessment_date
        ),
    );

    // Care
    let carers = assessment.carers();
    let cares: Vec<ChildCare> = inputs
        .children
        .iter()
        .map(|child| resolve_child_care(child, carers))
        .collect();
    for (i, (child, care)) in inputs.children.iter().zip(&cares).enumerate() {
        record_care(&mut audit, i, child, care);
        if child.is_adult() {
            audit.warn(
                "ADULT_CHILD_EXCLUDED",
                format!(
                    "Child {} (age {}) is an adult child and is excluded from the assessment",
                    i + 1,
                    child.age
                ),
                "medium",
            );
        } else if child.is_turning_18() {
            audit.warn(
                "CHILD_TURNING_18",
                format!(
                    "Child {} is 17; the assessment changes when they turn 18",
                    i + 1
                ),
                "low",
            );
        }
    }

    let assessable: Vec<usize> = inputs
        .children
        .iter()
        .enumerate()
        .filter(|(_, child)| !child.is_adult())
        .map(|(i, _)| i)
        .collect();
    let current_ages: Vec<u8> = assessable.iter().map(|&i| inputs.children[i].age).collect();
    if assessable.is_empty() {
        audit.warn(
            "NO_ASSESSABLE_CHILDREN",
            "No child in the case is under 18, so no child support is payable".to_string(),
            "medium",
        );
    }

    // Income
    let incomes = PerParent::from_fn(|parent| {
        if assessment.is_present(parent) {
            resolve_parent_income(
                inputs.parent(parent),
                rates,
                &current_ages,
                case_config.has_multi_case(parent),
            )
        } else {
            ParentIncome::absent(rates.self_support_amount)
        }
    });
    for parent in [Parent::ParentA, Parent::ParentB] {
        record_income(
            &mut audit,
            parent,
            assessment.is_present(parent),
            incomes.get(parent),
        );
    }
    let csi_a = incomes.a.child_support_income();
    let csi_b = incomes.b.child_support_income();

    let (income_perc, ccsi) = match assessment {
        Assessment::TwoParent { .. } => {
            let (a, b) = income_percentages(csi_a, csi_b);
            (PerParent { a, b }, csi_a + csi_b)
        }
        Assessment::SingleParent {
            absent, doubled, ..
        } => {
            let csi = incomes.get(absent.other()).child_support_income();
            let cost_income = if doubled { csi * Decimal::TWO } else { csi };
            let perc = PerParent::from_fn(|parent| {
                if parent == absent {
                    Decimal::ZERO
                } else {
                    Decimal::ONE_HUNDRED
                }
            });
            (perc, cost_income)
        }
    };
    debug!(%csi_a, %csi_b, %ccsi, "Child support income resolved");
    audit.step(
        "income_percentage",
        "Income Percentage",
        "steps 2 and 3",
        json!({ "csi_a": text(csi_a), "csi_b": text(csi_b) }),
        json!({
            "ccsi": text(ccsi),
            "income_perc_a": percent(income_perc.a),
            "income_perc_b": percent(income_perc.b),
        }),
        match assessment {
            Assessment::TwoParent { .. } => format!(
                "Combined income {} splits {}% to Parent A and {}% to Parent B",
                text(ccsi),
                percent(income_perc.a),
                percent(income_perc.b)
            ),
            Assessment::SingleParent { doubled: true, .. } => format!(
                "The available parent's income is doubled to {} to cost the children",
                text(ccsi)
            ),
            Assessment::SingleParent { doubled: false, .. } => format!(
                "The available parent's income of {} is used to cost the children",
                text(ccsi)
            ),
        },
    );

    // Cost of the children
    let cost = calculate_cost_of_children(&rates.cost_of_children, &current_ages, ccsi);
    debug!(
        total_cost = %cost.total_cost,
        cost_per_child = %cost.cost_per_child,
        "Cost of children resolved"
    );
    audit.step(
        "cost_of_children",
        "Cost of Children",
        "step 7",
        json!({ "income": text(ccsi), "ages": current_ages }),
        json!({
            "table": cost.table,
            "total_cost": text(cost.total_cost),
            "cost_per_child": text(cost.cost_per_child),
            "bracket": cost.bracket,
        }),
        match &cost.bracket {
            Some(bracket) => format!(
                "{} + {} × ({} − {}) = {} for {} children",
                text(bracket.fixed),
                text(bracket.rate),
                text(ccsi),
                text(bracket.min_income),
                text(cost.total_cost),
                cost.assessable_children
            ),
            None => "No assessable children to cost".to_string(),
        },
    );

    // Percentage formula
    let halve = matches!(assessment, Assessment::SingleParent { doubled: true, .. });
    let shares: Vec<ChildShares> = assessable
        .iter()
        .map(|&i| {
            let care = &cares[i];
            let child_support_perc = PerParent::from_fn(|parent| {
                child_support_percentage(
                    *income_perc.get(parent),
                    care.parent(parent).cost_percentage,
                )
            });
            let liability = PerParent::from_fn(|parent| {
                let perc = *child_support_perc.get(parent);
                if halve {
                    halved_liability(cost.cost_per_child, perc)
                } else {
                    standard_liability(cost.cost_per_child, perc)
                }
            });
            let payer = if assessment.is_two_parent() {
                parent_to_parent_payer(
                    child_support_perc.a,
                    child_support_perc.b,
                    care.parent_a.rounded,
                    care.parent_b.rounded,
                )
            } else {
                None
            };
            ChildShares {
                child_support_perc,
                liability,
                payer,
            }
        })
        .collect();

    // Flat rates
    let rate_recipients = |i: usize, payer: Parent| -> Vec<Recipient> {
        let care = &cares[i];
        let other_parent_receives = assessment.is_two_parent()
            && care.parent(payer.other()).rounded >= RECEIVING_CARE_THRESHOLD;
        eligible_recipients(care, payer, other_parent_receives)
    };
    let rate_outcomes = PerParent::from_fn(|parent| {
        if !assessment.is_present(parent) || assessable.is_empty() {
            return ParentRateOutcome::default();
        }
        let rounded: Vec<u8> = assessable
            .iter()
            .map(|&i| cares[i].parent(parent).rounded)
            .collect();
        let has_recipient: Vec<bool> = assessable
            .iter()
            .map(|&i| !rate_recipients(i, parent).is_empty())
            .collect();
        let (other_children, total_cases) = incomes
            .get(parent)
            .multi_case
            .as_ref()
            .map_or((0, 1), |m| (m.other_children, m.total_cases));
        assess_parent_rates(
            inputs.parent(parent),
            rates,
            &rounded,
            &has_recipient,
            other_children,
            total_cases,
        )
    });
    for parent in [Parent::ParentA, Parent::ParentB] {
        if assessment.is_present(parent) {
            record_rates(&mut audit, parent, rate_outcomes.get(parent));
        }
    }
    let mar_allocation = PerParent::from_fn(|parent| -> Vec<Option<Decimal>> {
        let Some(mar) = rate_outcomes.get(parent).mar else {
            return vec![None; assessable.len()];
        };
        let eligible: Vec<bool> = assessable
            .iter()
            .map(|&i| !rate_recipients(i, parent).is_empty())
            .collect();
        let mut split = split_evenly(mar, eligible.iter().filter(|&&e| e).count()).into_iter();
        eligible
            .into_iter()
            .map(|e| if e { split.next() } else { None })
            .collect()
    });

    // Per-child lines
    let line_for = |parent: Parent, k: usize, i: usize| -> ParentLine {
        if !assessment.is_present(parent) {
            return ParentLine::default();
        }
        let care = &cares[i];
        let rate = rate_outcomes.get(parent);
        if rate.far_applies(k) {
            return ParentLine {
                far: true,
                shares: distribute_by_cost(rate.far_per_child, &rate_recipients(i, parent), care),
                ..ParentLine::default()
            };
        }
        if let Some(amount) = mar_allocation.get(parent)[k] {
            return ParentLine {
                mar: true,
                shares: distribute_to_highest_care(amount, &rate_recipients(i, parent), care),
                ..ParentLine::default()
            };
        }

        let standard = *shares[k].liability.get(parent);
        if standard <= Decimal::ZERO {
            return ParentLine::default();
        }
        let recipients = eligible_recipients(care, parent, shares[k].payer == Some(parent));
        if recipients.is_empty() {
            return ParentLine {
                unpaid: true,
                ..ParentLine::default()
            };
        }

        let mut line = ParentLine::default();
        let mut amount = standard;
        if let Some(multi_case) = &incomes.get(parent).multi_case {
            let notional = multi_case.notional_cost(k).unwrap_or(Decimal::ZERO);
            let outcome = apply_multi_case_cap(
                standard,
                multi_case_cap(notional, care.parent(parent).cost_percentage),
            );
            amount = outcome.liability;
            line.cap = Some(outcome.cap);
            line.cap_applied = outcome.cap_applied;
        }
        line.shares = distribute_by_cost(amount, &recipients, care);
        line
    };

    let mut child_results = Vec::with_capacity(inputs.children.len());
    let mut carer_weights = (Decimal::ZERO, Decimal::ZERO);
    let mut k = 0;
    for (i, child) in inputs.children.iter().enumerate() {
        let care = &cares[i];
        if child.is_adult() {
            child_results.push(adult_child_result(child, care));
            continue;
        }

        let line_a = line_for(Parent::ParentA, k, i);
        let line_b = line_for(Parent::ParentB, k, i);
        for (parent, line) in [(Parent::ParentA, &line_a), (Parent::ParentB, &line_b)] {
            if line.unpaid {
                audit.warn(
                    "NO_ELIGIBLE_RECIPIENT",
                    format!(
                        "{} has a liability for child {} but nobody has the 35% care needed to receive it",
                        parent,
                        i + 1
                    ),
                    "low",
                );
            }
        }

        if let Some(npc) = care.npc.filter(|s| s.rounded >= RECEIVING_CARE_THRESHOLD) {
            carer_weights.0 += Decimal::from(npc.cost_percentage);
        }
        if let Some(npc2) = care.npc2.filter(|s| s.rounded >= RECEIVING_CARE_THRESHOLD) {
            carer_weights.1 += Decimal::from(npc2.cost_percentage);
        }

        let child_shares = &shares[k];
        let result = ChildResult {
            age: child.age,
            age_cohort: child.cohort(),
            is_adult_child: false,
            is_turning_18: child.is_turning_18(),
            care_a: care.parent_a.percentage,
            care_b: care.parent_b.percentage,
            care_npc: care.npc.map(|s| s.percentage),
            care_npc2: care.npc2.map(|s| s.percentage),
            rounded_care_a: care.parent_a.rounded,
            rounded_care_b: care.parent_b.rounded,
            rounded_care_npc: care.npc.map(|s| s.rounded),
            rounded_care_npc2: care.npc2.map(|s| s.rounded),
            cost_perc_a: care.parent_a.cost_percentage,
            cost_perc_b: care.parent_b.cost_percentage,
            cost_perc_npc: care.npc.map(|s| s.cost_percentage),
            cost_perc_npc2: care.npc2.map(|s| s.cost_percentage),
            child_support_perc_a: child_shares.child_support_perc.a,
            child_support_perc_b: child_shares.child_support_perc.b,
            cost_per_child: cost.cost_per_child,
            liability_a: child_shares.liability.a,
            liability_b: child_shares.liability.b,
            final_liability_a: parent_portion(&line_a.shares),
            final_liability_b: parent_portion(&line_b.shares),
            liability_to_npc_a: carers.map(|_| carer_portion(&line_a.shares)),
            liability_to_npc_b: carers.map(|_| carer_portion(&line_b.shares)),
            multi_case_cap_a: line_a.cap,
            multi_case_cap_b: line_b.cap,
            multi_case_cap_applied_a: line_a.cap_applied,
            multi_case_cap_applied_b: line_b.cap_applied,
            far_applied_a: line_a.far,
            far_applied_b: line_b.far,
            mar_applied_a: line_a.mar,
            mar_applied_b: line_b.mar,
            cost_bracket_info: cost.bracket.clone(),
        };

        audit.step(
            "child_liability",
            "Child Liability",
            "steps 6 and 8",
            json!({
                "child": i + 1,
                "cost_per_child": text(cost.cost_per_child),
                "child_support_perc_a": percent(result.child_support_perc_a),
                "child_support_perc_b": percent(result.child_support_perc_b),
            }),
            json!({
                "liability_a": text(result.liability_a),
                "liability_b": text(result.liability_b),
                "shares_a": line_a.shares,
                "shares_b": line_b.shares,
                "multi_case_cap_a": result.multi_case_cap_a.map(text),
                "multi_case_cap_b": result.multi_case_cap_b.map(text),
            }),
            describe_child(i, &result),
        );

        child_results.push(result);
        k += 1;
    }

    // Totals
    let total = |f: fn(&ChildResult) -> Decimal| -> Decimal { child_results.iter().map(f).sum() };
    let total_liability_a = total(|c| c.liability_a);
    let total_liability_b = total(|c| c.liability_b);
    let final_liability_a = total(|c| c.final_liability_a);
    let final_liability_b = total(|c| c.final_liability_b);
    let to_npc_a = total(|c| c.liability_to_npc_a.unwrap_or(Decimal::ZERO));
    let to_npc_b = total(|c| c.liability_to_npc_b.unwrap_or(Decimal::ZERO));

    let far_count = PerParent::from_fn(|parent| rate_outcomes.get(parent).far_count());
    let far = PerParent::from_fn(|parent| {
        rate_outcomes.get(parent).far_per_child * Decimal::from(*far_count.get(parent))
    });
    let mar = PerParent::from_fn(|parent| rate_outcomes.get(parent).mar.unwrap_or(Decimal::ZERO));

    let rate_applied = match rate_parties(far_count.a > 0, far_count.b > 0) {
        Some(parties) => RateApplied::Far {
            parties,
            children: child_results
                .iter()
                .filter(|c| c.far_applied_a || c.far_applied_b)
                .count() as u32,
        },
        None => match rate_parties(mar.a > Decimal::ZERO, mar.b > Decimal::ZERO) {
            Some(parties) => RateApplied::Mar { parties },
            None => RateApplied::None,
        },
    };

    // Carer payments
    let to_carers = to_npc_a + to_npc_b;
    let (payment_to_npc, payment_to_npc1, payment_to_npc2, npc_payment) = match carers {
        Some(count) => {
            let second = (count == CarerCount::Two).then_some(carer_weights.1);
            let split = split_between_carers(to_carers, carer_weights.0, second);
            audit.step(
                "npc_distribution",
                "Non-parent Carer Distribution",
                "carer payments",
                json!({
                    "to_npc_a": text(to_npc_a),
                    "to_npc_b": text(to_npc_b),
                    "cost_perc_npc1": text(carer_weights.0),
                    "cost_perc_npc2": second.map(text),
                }),
                json!({
                    "payment_to_npc1": text(split.npc1),
                    "payment_to_npc2": split.npc2.map(text),
                }),
                format!("{} is payable to carers in total", text(to_carers)),
            );
            (
                Some(to_carers),
                Some(split.npc1),
                split.npc2,
                Some(PeriodicAmounts::from_annual(to_carers)),
            )
        }
        None => (None, None, None, None),
    };

    // Payment
    let resolution = resolve_payment(final_liability_a, final_liability_b, to_npc_a, to_npc_b);
    let nothing_payable = (final_liability_a + final_liability_b + to_carers).is_zero();
    let zero_payment_reason = nothing_payable.then(|| {
        let mar_prevented = [Parent::ParentA, Parent::ParentB].into_iter().find(|&parent| {
            let rounded: Vec<u8> = assessable
                .iter()
                .map(|&i| cares[i].parent(parent).rounded)
                .collect();
            assessment.is_present(parent)
                && rate_outcomes.get(parent).mar.is_none()
                && mar_prevented_by_care(inputs.parent(parent), rates, &rounded)
        });
        detect_zero_payment(ccsi, mar_prevented, &child_results)
    });

    debug!(
        payer = %resolution.payer,
        amount = %resolution.final_payment_amount,
        rate_applied = %rate_applied,
        "Payment resolved"
    );
    audit.step(
        "payment_resolution",
        "Payment Resolution",
        "payment",
        json!({
            "final_liability_a": text(final_liability_a),
            "final_liability_b": text(final_liability_b),
            "to_npc_a": text(to_npc_a),
            "to_npc_b": text(to_npc_b),
        }),
        json!({
            "payer": resolution.payer,
            "receiver": resolution.receiver,
            "payer_role": resolution.payer_role,
            "final_payment_amount": text(resolution.final_payment_amount),
            "zero_payment_reason": zero_payment_reason,
        }),
        match &zero_payment_reason {
            Some(reason) => reason.explanation(),
            None => format!(
                "{} has the larger liability; {} is payable between the parents",
                resolution.payer,
                text(resolution.final_payment_amount)
            ),
        },
    );

    CalculationResults {
        formula_used: formula.number(),
        formula_name: formula.name().to_string(),
        rates_effective_date: rates.effective_date,
        self_support_amount: rates.self_support_amount,
        fixed_annual_rate: rates.fixed_annual_rate,
        minimum_annual_rate: rates.minimum_annual_rate,
        max_parenting_payment_single: rates.max_parenting_payment_single,
        financials_a: incomes.a.financials.clone(),
        financials_b: incomes.b.financials.clone(),
        csi_a,
        csi_b,
        ccsi,
        income_perc_a: income_perc.a,
        income_perc_b: income_perc.b,
        total_cost: cost.total_cost,
        cost_table: cost.table,
        cost_bracket_info: cost.bracket.clone(),
        total_liability_a,
        total_liability_b,
        final_liability_a,
        final_liability_b,
        far_a: far.a,
        far_b: far.b,
        mar_a: mar.a,
        mar_b: mar.b,
        far_cap_explanation_a: rate_outcomes.a.far_explanation.clone(),
        far_cap_explanation_b: rate_outcomes.b.far_explanation.clone(),
        mar_cap_explanation_a: rate_outcomes.a.mar_explanation.clone(),
        mar_cap_explanation_b: rate_outcomes.b.mar_explanation.clone(),
        rate_applied,
        payer: resolution.payer,
        receiver: resolution.receiver,
        payer_role: resolution.payer_role,
        final_payment_amount: resolution.final_payment_amount,
        final_payment: PeriodicAmounts::from_annual(resolution.final_payment_amount),
        payment_to_npc,
        payment_to_npc1,
        payment_to_npc2,
        npc_payment,
        multi_case_allowance_a: incomes.a.multi_case.as_ref().map(|m| m.allowance),
        multi_case_allowance_b: incomes.b.multi_case.as_ref().map(|m| m.allowance),
        multi_case_breakdown_a: incomes.a.multi_case.as_ref().map(|m| m.breakdown.clone()),
        multi_case_breakdown_b: incomes.b.multi_case.as_ref().map(|m| m.breakdown.clone()),
        multi_case_cap_applied_a: child_results.iter().any(|c| c.multi_case_cap_applied_a),
        multi_case_cap_applied_b: child_results.iter().any(|c| c.multi_case_cap_applied_b),
        child_results,
        zero_payment_reason,
        audit_trace: audit.into_trace(),
    }
}

fn describe_child(index: usize, result: &ChildResult) -> String {
    let describe = |parent: Parent, far: bool, mar: bool, to_parent: Decimal, to_npc: Option<Decimal>| {
        let to_npc = to_npc.unwrap_or(Decimal::ZERO);
        let basis = if far {
            "fixed annual rate"
        } else if mar {
            "minimum annual rate"
        } else {
            "percentage formula"
        };
        if to_parent.is_zero() && to_npc.is_zero() {
            None
        } else if to_npc.is_zero() {
            Some(format!("{} pays {} to {} ({})", parent, text(to_parent), parent.other(), basis))
        } else {
            Some(format!(
                "{} pays {} to the other parent and {} to carers ({})",
                parent,
                text(to_parent),
                text(to_npc),
                basis
            ))
        }
    };
    let lines: Vec<String> = [
        describe(
            Parent::ParentA,
            result.far_applied_a,
            result.mar_applied_a,
            result.final_liability_a,
            result.liability_to_npc_a,
        ),
        describe(
            Parent::ParentB,
            result.far_applied_b,
            result.mar_applied_b,
            result.final_liability_b,
            result.liability_to_npc_b,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    if lines.is_empty() {
        format!("Nothing is payable for child {}", index + 1)
    } else {
        format!("Child {}: {}", index + 1, lines.join("; "))
    }
}
