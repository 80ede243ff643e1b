use chrono::{Months, NaiveDate};
use equity_sim_core::valuation::{calculate_scenario, run_scenario, PlanType, ScenarioInputs};
use equity_sim_core::Currency;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn months_before(months: u32) -> NaiveDate {
    as_of().checked_sub_months(Months::new(months)).unwrap()
}

fn reference_grant() -> ScenarioInputs {
    ScenarioInputs {
        shares: dec!(1000),
        strike_price: dec!(0.5),
        company_valuation: dec!(10_000_000),
        total_shares: dec!(1_000_000),
        plan_type: PlanType::Esop,
        grant_date: None,
        vesting_months: 0,
        cliff_months: 0,
        expected_dilution: Decimal::ZERO,
        currency: Currency::EUR,
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_esop_reference_grant() {
    let r = calculate_scenario(&reference_grant(), as_of());
    assert_eq!(r.share_price, dec!(10));
    assert_eq!(r.equity_value, dec!(10_000));
    assert_eq!(r.cost_to_exercise, dec!(500));
    assert_eq!(r.profit, dec!(9_500));
    assert_eq!(r.ownership, dec!(0.1));
}

#[test]
fn test_phantom_reference_grant() {
    let mut input = reference_grant();
    input.plan_type = PlanType::Phantom;
    let r = calculate_scenario(&input, as_of());
    assert_eq!(r.cost_to_exercise, Decimal::ZERO);
    assert_eq!(r.profit, dec!(10_000));
}

#[test]
fn test_eighteen_months_into_four_year_schedule() {
    let mut input = reference_grant();
    input.grant_date = Some(months_before(18));
    input.vesting_months = 48;
    input.cliff_months = 12;
    let r = calculate_scenario(&input, as_of());
    assert_eq!(r.vested_percentage, dec!(37.5));
}

#[test]
fn test_six_months_inside_cliff() {
    let mut input = reference_grant();
    input.grant_date = Some(months_before(6));
    input.vesting_months = 48;
    input.cliff_months = 12;
    let r = calculate_scenario(&input, as_of());
    assert_eq!(r.vested_percentage, Decimal::ZERO);
}

#[test]
fn test_half_dilution() {
    let mut input = reference_grant();
    input.expected_dilution = dec!(50);
    let r = calculate_scenario(&input, as_of());
    assert_eq!(r.diluted_total_shares, dec!(2_000_000));
    assert_eq!(r.ownership, dec!(0.05));
    assert_eq!(r.original_ownership, dec!(0.1));
}

// ===========================================================================
// Vesting schedule shape
// ===========================================================================

#[test]
fn test_vesting_is_monotonic_across_schedule() {
    let mut input = reference_grant();
    input.vesting_months = 48;
    input.cliff_months = 12;

    let mut previous = Decimal::ZERO;
    for elapsed in 0..=60u32 {
        input.grant_date = Some(months_before(elapsed));
        let pct = calculate_scenario(&input, as_of()).vested_percentage;
        assert!(pct >= previous, "vesting dropped at month {elapsed}");
        if elapsed < 12 {
            assert_eq!(pct, Decimal::ZERO);
        }
        if elapsed >= 48 {
            assert_eq!(pct, dec!(100));
        }
        previous = pct;
    }
}

#[test]
fn test_day_of_month_ignored() {
    let mut input = reference_grant();
    input.vesting_months = 48;
    input.cliff_months = 0;
    input.grant_date = NaiveDate::from_ymd_opt(2026, 9, 30);
    let r = calculate_scenario(&input, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
    assert_eq!(r.months_elapsed, Some(1));
}

#[test]
fn test_deterministic_for_same_date() {
    let mut input = reference_grant();
    input.grant_date = Some(months_before(20));
    input.vesting_months = 48;
    input.cliff_months = 12;
    assert_eq!(
        calculate_scenario(&input, as_of()),
        calculate_scenario(&input, as_of())
    );
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_envelope_carries_metadata() {
    let out = run_scenario(&reference_grant(), as_of()).unwrap();
    assert!(out.methodology.contains("Scenario"));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert_eq!(out.assumptions["as_of"], "2026-10-18");
    assert_eq!(out.assumptions["plan_type"], "ESOP");
}

#[test]
fn test_envelope_serializes_results() {
    let out = run_scenario(&reference_grant(), as_of()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let profit: Decimal = json["result"]["profit"].as_str().unwrap().parse().unwrap();
    assert_eq!(profit, dec!(9_500));
    assert!(json["result"].get("months_elapsed").is_none());
}

#[test]
fn test_inputs_from_json_file_shape() {
    let json = r#"{
        "shares": 1000,
        "strike_price": 0.5,
        "company_valuation": 10000000,
        "total_shares": 1000000,
        "plan_type": "ESOP",
        "grant_date": "2025-04-18",
        "vesting_months": 48,
        "cliff_months": 12,
        "expected_dilution": 0,
        "currency": "USD"
    }"#;
    let input: ScenarioInputs = serde_json::from_str(json).unwrap();
    assert_eq!(input.currency, Currency::USD);
    let r = calculate_scenario(&input, as_of());
    assert_eq!(r.vested_percentage, dec!(37.5));
}
