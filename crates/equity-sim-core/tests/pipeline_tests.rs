use chrono::NaiveDate;
use equity_sim_core::comparison::{
    clone_scenario, compare_scenarios, exit_scenarios, run_comparison, LabeledScenario,
    ScenarioOverrides,
};
use equity_sim_core::display::{format_money, format_percent};
use equity_sim_core::tax::estimate::{run_estimate, TaxBasis};
use equity_sim_core::tax::find_jurisdiction;
use equity_sim_core::valuation::{calculate_scenario, PlanType, ScenarioInputs};
use equity_sim_core::Currency;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn grant() -> ScenarioInputs {
    ScenarioInputs {
        shares: dec!(5_000),
        strike_price: dec!(2),
        company_valuation: dec!(50_000_000),
        total_shares: dec!(2_000_000),
        grant_date: NaiveDate::from_ymd_opt(2024, 10, 1),
        vesting_months: 48,
        cliff_months: 12,
        expected_dilution: dec!(20),
        ..ScenarioInputs::default()
    }
}

// ===========================================================================
// Valuation -> tax
// ===========================================================================

#[test]
fn test_scenario_to_spanish_net() {
    let es = find_jurisdiction("ES").unwrap();
    let out = run_estimate(&grant(), as_of(), es, TaxBasis::Total, None).unwrap();
    let report = &out.result;

    // pool 2.5M, price 20, equity 100k, cost 10k
    assert_eq!(report.scenario.diluted_total_shares, dec!(2_500_000));
    assert_eq!(report.scenario.share_price, dec!(20));
    assert_eq!(report.scenario.profit, dec!(90_000));

    // 40k taxable: 6k @19% + 34k @21%
    assert_eq!(report.estimate.tax.taxable_amount, dec!(40_000));
    assert_eq!(report.estimate.tax.tax_paid, dec!(8_280));
    assert_eq!(report.estimate.tax.net_after_tax, dec!(81_720));
    assert_eq!(report.estimate.net_share + report.estimate.tax_share, dec!(100));
}

#[test]
fn test_vested_basis_follows_schedule() {
    let gb = find_jurisdiction("GB").unwrap();
    let out = run_estimate(&grant(), as_of(), gb, TaxBasis::Vested, None).unwrap();
    // 24 of 48 months elapsed
    assert_eq!(out.result.scenario.vested_percentage, dec!(50));
    assert_eq!(out.result.estimate.amount_taxed, dec!(45_000));
    assert_eq!(out.result.estimate.tax.tax_paid, dec!(8_400));
}

#[test]
fn test_display_of_pipeline_figures() {
    let r = calculate_scenario(&grant(), as_of());
    assert_eq!(format_money(r.profit, &Currency::EUR, false), "€90,000");
    assert_eq!(format_money(r.profit, &Currency::EUR, true), "€90K");
    assert_eq!(format_percent(r.ownership, 3), "0.200%");
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_overridden_copy_is_independent() {
    let base = grant();
    let phantom = clone_scenario(
        &base,
        Some(&ScenarioOverrides {
            plan_type: Some(PlanType::Phantom),
            ..ScenarioOverrides::default()
        }),
    );
    let scenarios = vec![
        LabeledScenario {
            id: "current".into(),
            label: "Current".into(),
            editable: false,
            inputs: base.clone(),
        },
        LabeledScenario {
            id: "phantom".into(),
            label: "Phantom".into(),
            editable: true,
            inputs: phantom,
        },
    ];
    let rows = compare_scenarios(&scenarios, as_of());
    assert_eq!(rows[0].cost_to_exercise, dec!(10_000));
    assert_eq!(rows[1].cost_to_exercise, dec!(0));
    assert_eq!(rows[1].profit - rows[0].profit, dec!(10_000));
    assert_eq!(base.plan_type, PlanType::Esop);
}

#[test]
fn test_exit_ladder_orders_by_valuation() {
    let exits = vec![
        ("Down round".to_string(), dec!(10_000_000)),
        ("Flat".to_string(), dec!(50_000_000)),
        ("IPO".to_string(), dec!(500_000_000)),
    ];
    let out = run_comparison(&exit_scenarios(&grant(), &exits), as_of()).unwrap();
    let rows = &out.result.rows;
    assert_eq!(rows.len(), 3);
    // 10M / 2.5M = 4 per share against a strike of 2
    assert_eq!(rows[0].profit, dec!(10_000));
    assert!(rows.windows(2).all(|w| w[0].profit <= w[1].profit));
    assert_eq!(out.result.best_profit_id.as_deref(), Some("ipo"));
    assert_eq!(out.assumptions["scenarios"], 3);
}
