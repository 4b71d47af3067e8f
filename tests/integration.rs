//! End-to-end tests for the child support engine.
//!
//! This test suite covers:
//! - Formula 1 golden scenarios
//! - Care expressed in nights
//! - Non-parent carers (formulas 2 and 4)
//! - Multi-case allowances and caps (formula 3)
//! - Fixed and minimum annual rates with their multi-case limits
//! - Overseas and deceased parents (formulas 5 and 6)
//! - Zero-payment outcomes
//! - Validation errors
//! - The HTTP API

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use child_support_engine::api::{AppState, create_router};
use child_support_engine::calculation::{MAX_ADJUSTED_TAXABLE_INCOME, compute, round_to_dollar};
use child_support_engine::config::{ConfigLoader, CostBracket, SchemeConfig};
use child_support_engine::error::EngineError;
use child_support_engine::models::{
    CalculationResults, CalculatorInputs, CarePeriod, CaseConfiguration, ChildCareArrangement,
    OtherCaseChild, Parent, ParentInput, Payer, PayerRole, RateApplied, RateParties,
    RelevantDependents, ZeroPaymentReason,
};

// =============================================================================
// Test Helpers
// =============================================================================

const CONFIG_DIR: &str = "./config/child_support";

fn loader() -> ConfigLoader {
    ConfigLoader::load(CONFIG_DIR).expect("Failed to load config")
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn child(age: u8, care_a: &str, care_b: &str) -> ChildCareArrangement {
    ChildCareArrangement {
        age,
        is_adult_child: false,
        care_amount_a: decimal(care_a),
        care_amount_b: decimal(care_b),
        care_amount_npc: None,
        care_amount_npc2: None,
        care_period: CarePeriod::Percent,
    }
}

fn cared_for(age: u8, care_a: &str, care_b: &str, npc: &str, npc2: Option<&str>) -> ChildCareArrangement {
    ChildCareArrangement {
        care_amount_npc: Some(decimal(npc)),
        care_amount_npc2: npc2.map(decimal),
        ..child(age, care_a, care_b)
    }
}

fn inputs(ati_a: &str, ati_b: &str, children: Vec<ChildCareArrangement>) -> CalculatorInputs {
    CalculatorInputs {
        assessment_date: date("2026-03-01"),
        parent_a: ParentInput::with_income(decimal(ati_a)),
        parent_b: ParentInput::with_income(decimal(ati_b)),
        children,
    }
}

fn assess(inputs: &CalculatorInputs, case_config: &CaseConfiguration) -> CalculationResults {
    compute(inputs, case_config, loader().config()).expect("calculation failed")
}

fn standard(inputs: &CalculatorInputs) -> CalculationResults {
    assess(inputs, &CaseConfiguration::default())
}

fn with_carers() -> CaseConfiguration {
    CaseConfiguration {
        has_npc: true,
        ..CaseConfiguration::default()
    }
}

fn unlabelled(ages: &[u8]) -> Vec<OtherCaseChild> {
    ages.iter()
        .map(|&age| OtherCaseChild { age, case_id: None })
        .collect()
}

fn has_warning(results: &CalculationResults, code: &str) -> bool {
    results.audit_trace.warnings.iter().any(|w| w.code == code)
}

/// Same scheme with the self-support amount replaced.
fn config_with_ssa(ssa: &str) -> SchemeConfig {
    let loader = loader();
    let mut rates = loader
        .rates_for(date("2026-03-01"))
        .expect("2026 rates")
        .clone();
    rates.self_support_amount = decimal(ssa);
    SchemeConfig::new(loader.metadata().clone(), vec![rates])
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

// =============================================================================
// Formula 1
// =============================================================================

#[test]
fn test_scenario_a_receiving_parent_not_liable() {
    let config = config_with_ssa("35168");
    let results = compute(
        &inputs("60000", "40000", vec![child(8, "100", "0")]),
        &CaseConfiguration::default(),
        &config,
    )
    .unwrap();

    assert_eq!(results.csi_a, decimal("24832"));
    assert_eq!(results.csi_b, decimal("4832"));
    assert_eq!(results.ccsi, decimal("29664"));

    let c = &results.child_results[0];
    assert_eq!(c.cost_perc_a, 100);
    assert_eq!(c.cost_perc_b, 0);
    assert_eq!(c.child_support_perc_a, Decimal::ZERO);
    assert_eq!(c.final_liability_a, Decimal::ZERO);

    // 29664 × 0.17 = 5042.88; B's share is 4832 / 29664 of it
    assert_eq!(c.final_liability_b, decimal("821"));
    assert_eq!(results.payer, Payer::ParentB);
    assert_eq!(results.receiver, Payer::ParentA);
    assert_eq!(results.payer_role, PayerRole::ReceivingParent);
    assert_eq!(results.mar_b, Decimal::ZERO);
}

#[test]
fn test_scenario_b_precomputed_golden_figure() {
    // A flat 12% table with no self-support amount: 100000 costs 12000.
    let loader = loader();
    let mut rates = loader
        .rates_for(date("2026-03-01"))
        .expect("2026 rates")
        .clone();
    rates.self_support_amount = Decimal::ZERO;
    rates.cost_of_children.under_13.one_child = vec![CostBracket {
        min_income: Decimal::ZERO,
        max_income: None,
        fixed: Decimal::ZERO,
        rate: decimal("0.12"),
    }];
    let config = SchemeConfig::new(loader.metadata().clone(), vec![rates]);

    let results = compute(
        &inputs("60000", "40000", vec![child(8, "0", "100")]),
        &CaseConfiguration::default(),
        &config,
    )
    .unwrap();

    assert_eq!(results.ccsi, decimal("100000"));
    assert_eq!(results.total_cost, decimal("12000"));
    assert_eq!(results.income_perc_a, decimal("60"));
    let c = &results.child_results[0];
    assert_eq!(c.child_support_perc_a, decimal("60"));
    assert_eq!(c.liability_a, decimal("7200"));
    assert_eq!(results.final_liability_a, decimal("7200"));
    assert_eq!(results.final_payment_amount, decimal("7200"));
    assert_eq!(results.payer, Payer::ParentA);
}

#[test]
fn test_manual_f1_001() {
    let results = standard(&inputs("80000", "60000", vec![child(10, "0", "100")]));

    assert_eq!(results.rates_effective_date, date("2026-01-01"));
    assert_eq!(results.csi_a, decimal("48954"));
    assert_eq!(results.csi_b, decimal("28954"));
    assert_eq!(results.ccsi, decimal("77908"));
    assert_eq!(results.total_cost, decimal("12617.85"));
    let bracket = results.cost_bracket_info.as_ref().unwrap();
    assert_eq!(bracket.min_income, decimal("46569"));
    assert_eq!(bracket.income_in_bracket, decimal("31339"));

    assert_eq!(results.final_liability_a, decimal("7929"));
    assert_eq!(results.final_payment_amount, decimal("7929"));
    assert_eq!(results.final_payment.monthly, decimal("660.75"));
    assert_eq!(results.final_payment.fortnightly, decimal("304.96"));
    assert_eq!(results.rate_applied.to_string(), "None");
}

#[test]
fn test_earlier_assessment_uses_earlier_rates() {
    let mut i = inputs("80000", "60000", vec![child(10, "0", "100")]);
    i.assessment_date = date("2025-06-30");
    let results = standard(&i);

    assert_eq!(results.rates_effective_date, date("2025-01-01"));
    assert_eq!(results.self_support_amount, decimal("29841"));
    assert_eq!(results.csi_a, decimal("50159"));
}

#[test]
fn test_care_in_nights_matches_percentages() {
    let nights = ChildCareArrangement {
        care_amount_a: decimal("4"),
        care_amount_b: decimal("10"),
        care_period: CarePeriod::Fortnight,
        ..child(10, "0", "0")
    };
    let results = standard(&inputs("80000", "60000", vec![nights]));

    let c = &results.child_results[0];
    // 4 / 14 = 28.57% rounds down to 28; 10 / 14 = 71.43% rounds up to 72
    assert_eq!(c.rounded_care_a, 28);
    assert_eq!(c.rounded_care_b, 72);
    assert_eq!(c.cost_perc_a, 24);
    assert_eq!(c.cost_perc_b, 76);
    assert!(c.final_liability_a > Decimal::ZERO);
    assert_eq!(c.final_liability_b, Decimal::ZERO);
}

#[test]
fn test_relevant_dependents_reduce_income() {
    let mut i = inputs("80000", "60000", vec![child(10, "0", "100")]);
    let without = standard(&i);
    i.parent_a.relevant_dependents = RelevantDependents {
        under_13: 1,
        thirteen_plus: 0,
    };
    let with = standard(&i);

    assert!(with.financials_a.relevant_dependent_allowance > Decimal::ZERO);
    assert!(with.csi_a < without.csi_a);
    assert!(with.final_liability_a < without.final_liability_a);
}

#[test]
fn test_payer_exclusive_per_child() {
    let results = standard(&inputs(
        "95000",
        "70000",
        vec![child(4, "40", "60"), child(14, "60", "40"), child(16, "0", "100")],
    ));

    for c in &results.child_results {
        assert!(
            c.final_liability_a.is_zero() || c.final_liability_b.is_zero(),
            "both parents pay for the same child: {:?}",
            c
        );
    }
}

// =============================================================================
// Non-parent carers
// =============================================================================

#[test]
fn test_two_carers_share_payments() {
    let flags = CaseConfiguration {
        has_npc: true,
        has_second_npc: true,
        ..CaseConfiguration::default()
    };
    let results = assess(
        &inputs("80000", "60000", vec![cared_for(10, "0", "0", "50", Some("50"))]),
        &flags,
    );

    assert_eq!(results.formula_used, 2);
    assert_eq!(results.payment_to_npc, Some(decimal("12618")));
    assert_eq!(results.payment_to_npc1, Some(decimal("6309")));
    assert_eq!(results.payment_to_npc2, Some(decimal("6309")));
    assert_eq!(results.payer_role, PayerRole::BothPaying);
    assert_eq!(results.npc_payment.unwrap().monthly, decimal("1051.50"));
}

#[test]
fn test_carer_with_multi_case_is_formula_4() {
    let mut i = inputs("80000", "60000", vec![cared_for(10, "0", "0", "100", None)]);
    i.parent_a.other_case_children = unlabelled(&[6]);
    let flags = CaseConfiguration {
        has_npc: true,
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    assert_eq!(results.formula_used, 4);
    assert!(results.multi_case_allowance_a.is_some());
    assert!(results.multi_case_allowance_b.is_none());
    assert!(results.payment_to_npc.unwrap() > Decimal::ZERO);
}

#[test]
fn test_carer_below_threshold_receives_nothing() {
    let results = assess(
        &inputs("80000", "60000", vec![cared_for(10, "40", "30", "30", None)]),
        &with_carers(),
    );

    assert_eq!(results.payment_to_npc, Some(Decimal::ZERO));
    assert!(has_warning(&results, "NO_ELIGIBLE_RECIPIENT"));
}

// =============================================================================
// Multi-case
// =============================================================================

#[test]
fn test_multi_case_breakdown_lists_current_children_first() {
    let mut i = inputs("120000", "50000", vec![child(5, "0", "100"), child(9, "0", "100")]);
    i.parent_a.other_case_children = vec![
        OtherCaseChild {
            age: 15,
            case_id: Some("C-1".to_string()),
        },
        OtherCaseChild {
            age: 20,
            case_id: Some("C-1".to_string()),
        },
    ];
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    assert_eq!(results.formula_used, 3);
    let breakdown = results.multi_case_breakdown_a.as_ref().unwrap();
    // The 20-year-old is an adult and is left out.
    assert_eq!(breakdown.len(), 3);
    assert!(breakdown[0].is_current_case && breakdown[1].is_current_case);
    assert!(!breakdown[2].is_current_case);
    assert_eq!(
        results.multi_case_allowance_a,
        Some(round_to_dollar(breakdown[2].cost_per_child))
    );
    assert_eq!(
        results.financials_a.multi_case_allowance,
        results.multi_case_allowance_a.unwrap()
    );
}

#[test]
fn test_multi_case_cap_never_exceeds_standard() {
    let mut i = inputs("150000", "30000", vec![child(3, "0", "100")]);
    i.parent_a.other_case_children = unlabelled(&[15, 16, 17]);
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    let c = &results.child_results[0];
    let cap = c.multi_case_cap_a.expect("payer has a cap");
    assert!(c.final_liability_a <= c.liability_a);
    if c.multi_case_cap_applied_a {
        assert_eq!(c.final_liability_a, cap);
        assert!(cap < c.liability_a);
        assert!(results.multi_case_cap_applied_a);
    } else {
        assert_eq!(c.final_liability_a, c.liability_a);
    }
}

#[test]
fn test_multi_case_receiver_is_never_capped() {
    let mut i = inputs("40000", "150000", vec![child(3, "100", "0")]);
    i.parent_a.other_case_children = unlabelled(&[1]);
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    assert_eq!(results.payer, Payer::ParentB);
    assert!(!results.multi_case_cap_applied_a);
    assert!(results.child_results.iter().all(|c| !c.multi_case_cap_applied_a));
}

#[test]
fn test_multi_case_allowance_with_relevant_dependents() {
    let mut i = inputs("71046", "40000", vec![child(8, "0", "100")]);
    i.parent_a.relevant_dependents = RelevantDependents {
        under_13: 1,
        thirteen_plus: 0,
    };
    i.parent_a.other_case_children = unlabelled(&[4]);
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    assert_eq!(results.financials_a.relevant_dependent_allowance, decimal("6800"));
    // Both children under 13 costed at 71046 − 31046 = 40000: 40000 × 0.24 / 2
    assert_eq!(results.multi_case_allowance_a, Some(decimal("4800")));
    assert_eq!(results.csi_a, decimal("28400"));

    // The cap is costed at the income left after relevant dependents, 33200
    let c = &results.child_results[0];
    assert_eq!(c.multi_case_cap_a, Some(decimal("3984")));
    assert!(c.liability_a > decimal("3984"));
    assert!(c.multi_case_cap_applied_a);
    assert_eq!(c.final_liability_a, decimal("3984"));
}

// =============================================================================
// Fixed and minimum annual rates
// =============================================================================

#[test]
fn test_far_shared_across_other_case_children() {
    let mut i = inputs("20000", "90000", vec![child(5, "0", "100"), child(7, "0", "100")]);
    i.parent_a.other_case_children = unlabelled(&[2, 3, 4]);
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    // 3 × 1825 / 5 = 1095 per child
    assert_eq!(results.far_a, decimal("2190"));
    assert_eq!(results.final_liability_a, decimal("2190"));
    assert!(results.far_cap_explanation_a.is_some());
    assert!(has_warning(&results, "FAR_CHILD_LIMIT"));
    assert_eq!(
        results.rate_applied,
        RateApplied::Far {
            parties: RateParties::ParentA,
            children: 2
        }
    );
}

#[test]
fn test_mar_shared_across_cases() {
    let mut i = inputs("15000", "90000", vec![child(5, "0", "100")]);
    i.parent_a.receives_income_support = true;
    i.parent_a.other_case_children = unlabelled(&[2, 3, 4, 6]);
    let flags = CaseConfiguration {
        has_multi_case_a: true,
        ..CaseConfiguration::default()
    };
    let results = assess(&i, &flags);

    // Five cases: 3 × 551 / 5 = 330.6
    assert_eq!(results.mar_a, decimal("331"));
    assert_eq!(results.final_liability_a, decimal("331"));
    assert!(results.mar_cap_explanation_a.is_some());
    assert!(has_warning(&results, "MAR_CASE_LIMIT"));
    assert_eq!(results.rate_applied.to_string(), "MAR (Parent A)");
}

// =============================================================================
// Overseas and deceased parents
// =============================================================================

#[test]
fn test_overseas_parent_a_absent() {
    let flags = CaseConfiguration {
        has_npc: true,
        has_overseas_parent: true,
        unavailable_parent: Parent::ParentA,
        ..CaseConfiguration::default()
    };
    let results = assess(
        &inputs("0", "70000", vec![cared_for(10, "0", "0", "100", None)]),
        &flags,
    );

    assert_eq!(results.formula_used, 5);
    assert_eq!(results.csi_a, Decimal::ZERO);
    assert_eq!(results.csi_b, decimal("38954"));
    // Doubled to 77908: cost 12617.85, halved and rounded
    assert_eq!(results.ccsi, decimal("77908"));
    assert_eq!(results.payment_to_npc, Some(decimal("6309")));
    assert_eq!(results.final_payment_amount, Decimal::ZERO);
}

#[test]
fn test_deceased_parent_uses_single_income() {
    let flags = CaseConfiguration {
        has_npc: true,
        has_deceased_parent: true,
        unavailable_parent: Parent::ParentA,
        ..CaseConfiguration::default()
    };
    let results = assess(
        &inputs("0", "80000", vec![cared_for(10, "0", "0", "100", None)]),
        &flags,
    );

    assert_eq!(results.formula_used, 6);
    assert_eq!(results.income_perc_b, decimal("100"));
    assert_eq!(results.ccsi, decimal("48954"));
    assert_eq!(results.child_results[0].liability_to_npc_b, Some(decimal("8275")));
    assert_eq!(results.payment_to_npc, Some(decimal("8275")));
}

#[test]
fn test_single_parent_formula_requires_carer() {
    let flags = CaseConfiguration {
        has_overseas_parent: true,
        ..CaseConfiguration::default()
    };
    let result = compute(
        &inputs("80000", "0", vec![child(10, "100", "0")]),
        &flags,
        loader().config(),
    );
    assert!(matches!(result, Err(EngineError::InputValidation { .. })));
}

// =============================================================================
// Zero-payment outcomes
// =============================================================================

#[test]
fn test_zero_income_outcome() {
    let results = standard(&inputs("30000", "0", vec![child(10, "0", "100")]));

    assert_eq!(results.ccsi, Decimal::ZERO);
    assert_eq!(results.income_perc_a, decimal("50"));
    assert_eq!(results.final_payment_amount, Decimal::ZERO);
    assert_eq!(results.payer, Payer::Neither);
    assert_eq!(results.zero_payment_reason, Some(ZeroPaymentReason::ZeroIncome));
}

#[test]
fn test_only_adult_children() {
    let results = standard(&inputs("80000", "60000", vec![child(19, "0", "100")]));

    assert_eq!(results.total_cost, Decimal::ZERO);
    assert!(results.cost_bracket_info.is_none());
    assert_eq!(results.final_payment_amount, Decimal::ZERO);
    assert!(results.child_results[0].is_adult_child);
    assert!(has_warning(&results, "ADULT_CHILD_EXCLUDED"));
    assert!(has_warning(&results, "NO_ASSESSABLE_CHILDREN"));
}

#[test]
fn test_turning_18_is_advisory() {
    let results = standard(&inputs("80000", "60000", vec![child(17, "0", "100")]));

    assert!(results.child_results[0].is_turning_18);
    assert!(results.final_liability_a > Decimal::ZERO);
    assert!(has_warning(&results, "CHILD_TURNING_18"));
}

// =============================================================================
// Validation and determinism
// =============================================================================

#[test]
fn test_validation_rejects_excess_care() {
    let nights = ChildCareArrangement {
        care_amount_a: decimal("5"),
        care_amount_b: decimal("3"),
        care_period: CarePeriod::Week,
        ..child(10, "0", "0")
    };
    match compute(
        &inputs("80000", "60000", vec![nights]),
        &CaseConfiguration::default(),
        loader().config(),
    ) {
        Err(EngineError::InputValidation { field, .. }) => assert_eq!(field, "inputs.children[0]"),
        other => panic!("Expected InputValidation, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_income_beyond_maximum() {
    let mut i = inputs("0", "0", vec![child(8, "0", "100")]);
    i.parent_a.adjusted_taxable_income = Decimal::MAX;
    i.parent_b.adjusted_taxable_income = Decimal::MAX;

    match compute(&i, &CaseConfiguration::default(), loader().config()) {
        Err(EngineError::InputValidation { field, .. }) => {
            assert_eq!(field, "inputs.parent_a.adjusted_taxable_income")
        }
        other => panic!("Expected InputValidation, got {:?}", other),
    }

    i.parent_a.adjusted_taxable_income = Decimal::from(MAX_ADJUSTED_TAXABLE_INCOME);
    i.parent_b.adjusted_taxable_income = Decimal::from(MAX_ADJUSTED_TAXABLE_INCOME);
    let results = standard(&i);
    assert!(results.final_liability_a > Decimal::ZERO);
}

#[test]
fn test_validation_rejects_conflicting_single_parent_flags() {
    let flags = CaseConfiguration {
        has_npc: true,
        has_overseas_parent: true,
        has_deceased_parent: true,
        ..CaseConfiguration::default()
    };
    let result = compute(
        &inputs("80000", "0", vec![cared_for(10, "0", "0", "100", None)]),
        &flags,
        loader().config(),
    );
    assert!(matches!(result, Err(EngineError::InputValidation { .. })));
}

#[test]
fn test_compute_is_idempotent() {
    let i = inputs(
        "95000",
        "70000",
        vec![child(4, "40", "60"), child(14, "60", "40")],
    );
    let first = serde_json::to_string(&standard(&i)).unwrap();
    let second = serde_json::to_string(&standard(&i)).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// HTTP API
// =============================================================================

#[tokio::test]
async fn test_api_calculate_envelope() {
    let router = create_router(AppState::new(loader()));
    let body = json!({
        "inputs": {
            "assessment_date": "2026-03-01",
            "parent_a": { "adjusted_taxable_income": "80000" },
            "parent_b": { "adjusted_taxable_income": "60000" },
            "children": [
                { "age": 10, "care_amount_a": "0", "care_amount_b": "14", "care_period": "fortnight" }
            ]
        }
    });

    let (status, first) = post(router.clone(), "/calculate", body.clone()).await;
    let (_, second) = post(router, "/calculate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        decimal(first["result"]["final_liability_a"].as_str().unwrap()),
        decimal("7929")
    );
    assert_eq!(first["result"]["payer"], "parent_a");
    assert_eq!(first["result"]["rate_applied"]["kind"], "none");
    assert!(first["result"].get("payment_to_npc").is_none());
    assert_ne!(first["calculation_id"], second["calculation_id"]);
    assert_eq!(first["result"], second["result"]);
}

#[tokio::test]
async fn test_api_validation_error_names_field() {
    let router = create_router(AppState::new(loader()));
    let body = json!({
        "inputs": {
            "assessment_date": "2026-03-01",
            "parent_a": { "adjusted_taxable_income": "80000" },
            "parent_b": { "adjusted_taxable_income": "60000" },
            "children": []
        }
    });

    let (status, error) = post(router, "/calculate", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert_eq!(error["field"], "inputs.children");
}
