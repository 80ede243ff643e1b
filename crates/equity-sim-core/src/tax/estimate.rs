use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use crate::math::{sat_div, sat_mul, sat_sub};
use crate::tax::calculator::{applicable_custom_rate, calculate_tax, TaxResult};
use crate::tax::jurisdictions::TaxJurisdiction;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::valuation::scenario::{calculate_scenario, scenario_warnings, ScenarioInputs, ScenarioResults};
use crate::EquitySimResult;

/// Which profit figure gets taxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    /// Profit on the whole grant at exit.
    #[default]
    Total,
    /// Profit on what has vested as of the evaluation date.
    Vested,
}

impl TaxBasis {
    pub fn amount(self, results: &ScenarioResults) -> Money {
        match self {
            TaxBasis::Total => results.profit,
            TaxBasis::Vested => results.vested_profit,
        }
    }
}

/// Tax on a scenario's profit, with the net/tax split of the taxed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub jurisdiction: String,
    pub basis: TaxBasis,
    pub amount_taxed: Money,
    pub tax: TaxResult,
    /// Net as a share of the taxed amount, never below 0.
    pub net_share: Percent,
    /// `100 - net_share`.
    pub tax_share: Percent,
}

/// Tax the chosen basis of an already valued scenario. `custom_rate` is
/// passed straight through; gate it with `applicable_custom_rate` first.
pub fn estimate_net(
    results: &ScenarioResults,
    jurisdiction: &TaxJurisdiction,
    basis: TaxBasis,
    custom_rate: Option<Percent>,
) -> TaxEstimate {
    let amount = basis.amount(results);
    let tax = calculate_tax(amount, jurisdiction, custom_rate);

    let net_share = if amount > Decimal::ZERO {
        sat_mul(sat_div(tax.net_after_tax, amount), dec!(100)).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    TaxEstimate {
        jurisdiction: jurisdiction.code.clone(),
        basis,
        amount_taxed: amount,
        tax,
        net_share,
        tax_share: sat_sub(dec!(100), net_share),
    }
}

/// Scenario valuation and tax estimate together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateReport {
    pub scenario: ScenarioResults,
    pub estimate: TaxEstimate,
}

/// Full pipeline: validate inputs, value the scenario, tax the chosen basis.
pub fn run_estimate(
    inputs: &ScenarioInputs,
    as_of: NaiveDate,
    jurisdiction: &TaxJurisdiction,
    basis: TaxBasis,
    custom_rate: Option<Percent>,
) -> EquitySimResult<ComputationOutput<EstimateReport>> {
    let start = Instant::now();
    inputs.validate()?;

    let mut warnings = scenario_warnings(inputs, as_of);
    let rate = applicable_custom_rate(jurisdiction, custom_rate, &mut warnings)?;

    let scenario = calculate_scenario(inputs, as_of);
    if scenario.is_saturated() {
        warnings.push("figures exceed the decimal range; saturated values reported".into());
    }
    for w in &warnings {
        warn!("{w}");
    }
    let estimate = estimate_net(&scenario, jurisdiction, basis, rate);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Net Proceeds Estimate (scenario valuation followed by capital gains tax)",
        &serde_json::json!({
            "jurisdiction": jurisdiction.code,
            "regime": jurisdiction.regime.label(),
            "basis": basis,
            "custom_rate": rate.map(|r| r.to_string()),
            "as_of": as_of.to_string(),
            "currency": inputs.currency.code(),
        }),
        warnings,
        elapsed,
        EstimateReport { scenario, estimate },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::jurisdictions::find_jurisdiction;
    use crate::valuation::PlanType;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
    }

    fn grant() -> ScenarioInputs {
        ScenarioInputs {
            shares: dec!(10_000),
            strike_price: dec!(1),
            company_valuation: dec!(100_000_000),
            total_shares: dec!(1_000_000),
            plan_type: PlanType::Esop,
            grant_date: NaiveDate::from_ymd_opt(2024, 8, 1),
            vesting_months: 48,
            cliff_months: 12,
            ..ScenarioInputs::default()
        }
    }

    #[test]
    fn test_total_basis_taxes_full_profit() {
        let results = calculate_scenario(&grant(), as_of());
        // 10k shares * 100 - 10k strike
        assert_eq!(results.profit, dec!(990_000));

        let fr = find_jurisdiction("FR").unwrap();
        let est = estimate_net(&results, fr, TaxBasis::Total, None);
        assert_eq!(est.amount_taxed, dec!(990_000));
        assert_eq!(est.tax.tax_paid, dec!(297_000));
        assert_eq!(est.net_share, dec!(70));
        assert_eq!(est.tax_share, dec!(30));
    }

    #[test]
    fn test_vested_basis_taxes_vested_profit() {
        let results = calculate_scenario(&grant(), as_of());
        assert_eq!(results.vested_profit, dec!(371_250));

        let fr = find_jurisdiction("FR").unwrap();
        let est = estimate_net(&results, fr, TaxBasis::Vested, None);
        assert_eq!(est.amount_taxed, dec!(371_250));
        assert_eq!(est.tax.tax_paid, dec!(111_375));
    }

    #[test]
    fn test_nothing_to_tax_gives_zero_shares() {
        let mut inputs = grant();
        inputs.grant_date = NaiveDate::from_ymd_opt(2025, 12, 1);
        let results = calculate_scenario(&inputs, as_of());
        let es = find_jurisdiction("ES").unwrap();
        let est = estimate_net(&results, es, TaxBasis::Vested, None);
        assert_eq!(est.amount_taxed, Decimal::ZERO);
        assert_eq!(est.net_share, Decimal::ZERO);
        assert_eq!(est.tax_share, dec!(100));
    }

    #[test]
    fn test_run_estimate_gates_custom_rate() {
        let de = find_jurisdiction("DE").unwrap();
        let out = run_estimate(&grant(), as_of(), de, TaxBasis::Total, Some(dec!(1))).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("custom_rate ignored")));
        // 989_000 * 26.375%
        assert_eq!(out.result.estimate.tax.tax_paid, dec!(260_848.75));

        let other = find_jurisdiction("OTHER").unwrap();
        let out = run_estimate(&grant(), as_of(), other, TaxBasis::Total, Some(dec!(10))).unwrap();
        assert_eq!(out.result.estimate.tax.tax_paid, dec!(99_000));
    }

    #[test]
    fn test_run_estimate_on_saturated_profit() {
        let inputs = ScenarioInputs {
            shares: dec!(1_000_000_000_000),
            company_valuation: dec!(100_000_000_000_000_000),
            total_shares: Decimal::ZERO,
            grant_date: None,
            ..grant()
        };
        let fr = find_jurisdiction("FR").unwrap();
        let out = run_estimate(&inputs, as_of(), fr, TaxBasis::Total, None).unwrap();
        let est = &out.result.estimate;
        assert!(est.tax.tax_paid > Decimal::ZERO);
        assert_eq!(est.net_share.round_dp(6), dec!(70));
        assert!(out.warnings.iter().any(|w| w.contains("saturated")));
    }

    #[test]
    fn test_basis_serde() {
        assert_eq!(serde_json::to_string(&TaxBasis::Vested).unwrap(), "\"vested\"");
    }
}
