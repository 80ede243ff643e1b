use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::EquitySimError;
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Percent, Shares};
use crate::valuation::scenario::{calculate_scenario, scenario_warnings, PlanType, ScenarioInputs};
use crate::EquitySimResult;

// ---------------------------------------------------------------------------
// Labeled scenarios
// ---------------------------------------------------------------------------

/// A named snapshot of inputs, independent of the primary scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledScenario {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub editable: bool,
    pub inputs: ScenarioInputs,
}

/// Partial inputs laid over a base scenario. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    pub shares: Option<Shares>,
    pub strike_price: Option<Money>,
    pub company_valuation: Option<Money>,
    pub total_shares: Option<Shares>,
    pub plan_type: Option<PlanType>,
    pub grant_date: Option<NaiveDate>,
    pub vesting_months: Option<u32>,
    pub cliff_months: Option<u32>,
    pub expected_dilution: Option<Percent>,
    pub currency: Option<Currency>,
}

impl ScenarioOverrides {
    pub fn apply(&self, base: &ScenarioInputs) -> ScenarioInputs {
        ScenarioInputs {
            shares: self.shares.unwrap_or(base.shares),
            strike_price: self.strike_price.unwrap_or(base.strike_price),
            company_valuation: self.company_valuation.unwrap_or(base.company_valuation),
            total_shares: self.total_shares.unwrap_or(base.total_shares),
            plan_type: self.plan_type.unwrap_or(base.plan_type),
            grant_date: self.grant_date.or(base.grant_date),
            vesting_months: self.vesting_months.unwrap_or(base.vesting_months),
            cliff_months: self.cliff_months.unwrap_or(base.cliff_months),
            expected_dilution: self.expected_dilution.unwrap_or(base.expected_dilution),
            currency: self.currency.clone().unwrap_or_else(|| base.currency.clone()),
        }
    }
}

/// Copy of `base` with `overrides` applied, if any.
pub fn clone_scenario(base: &ScenarioInputs, overrides: Option<&ScenarioOverrides>) -> ScenarioInputs {
    match overrides {
        Some(o) => o.apply(base),
        None => base.clone(),
    }
}

/// One labeled scenario per exit valuation, all sharing the plan parameters of `base`.
pub fn exit_scenarios(base: &ScenarioInputs, exits: &[(String, Money)]) -> Vec<LabeledScenario> {
    exits
        .iter()
        .map(|(label, valuation)| LabeledScenario {
            id: slug(label),
            label: label.clone(),
            editable: false,
            inputs: ScenarioOverrides {
                company_valuation: Some(*valuation),
                ..ScenarioOverrides::default()
            }
            .apply(base),
        })
        .collect()
}

fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub id: String,
    pub label: String,
    pub editable: bool,
    pub company_valuation: Money,
    pub ownership: Percent,
    pub equity_value: Money,
    pub cost_to_exercise: Money,
    pub profit: Money,
    pub vested_profit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
    /// Id of the row with the highest gross profit.
    pub best_profit_id: Option<String>,
}

/// Value every scenario at the same evaluation date. Rows keep input order.
pub fn compare_scenarios(scenarios: &[LabeledScenario], as_of: NaiveDate) -> Vec<ComparisonRow> {
    scenarios
        .iter()
        .map(|s| {
            let r = calculate_scenario(&s.inputs, as_of);
            ComparisonRow {
                id: s.id.clone(),
                label: s.label.clone(),
                editable: s.editable,
                company_valuation: s.inputs.company_valuation,
                ownership: r.ownership,
                equity_value: r.equity_value,
                cost_to_exercise: r.cost_to_exercise,
                profit: r.profit,
                vested_profit: r.vested_profit,
            }
        })
        .collect()
}

/// Validate each scenario, compare, and wrap the table.
pub fn run_comparison(
    scenarios: &[LabeledScenario],
    as_of: NaiveDate,
) -> EquitySimResult<ComputationOutput<ComparisonTable>> {
    let start = Instant::now();
    if scenarios.is_empty() {
        return Err(EquitySimError::InvalidInput {
            field: "scenarios".into(),
            reason: "At least one scenario is required".into(),
        });
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut ids = HashSet::new();
    for s in scenarios {
        s.inputs.validate().map_err(|e| match e {
            EquitySimError::InvalidInput { field, reason } => EquitySimError::InvalidInput {
                field: format!("{}.{field}", s.label),
                reason,
            },
            other => other,
        })?;
        if !ids.insert(s.id.as_str()) {
            warnings.push(format!("duplicate scenario id '{}'", s.id));
        }
        warnings.extend(
            scenario_warnings(&s.inputs, as_of)
                .into_iter()
                .map(|w| format!("{}: {w}", s.label)),
        );
    }
    for w in &warnings {
        warn!("{w}");
    }

    let rows = compare_scenarios(scenarios, as_of);
    let best_profit_id = rows
        .iter()
        .max_by(|a, b| a.profit.cmp(&b.profit))
        .map(|r| r.id.clone());
    debug!(rows = rows.len(), "scenarios compared");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario Comparison (one valuation per labeled scenario)",
        &serde_json::json!({
            "scenarios": scenarios.len(),
            "as_of": as_of.to_string(),
        }),
        warnings,
        elapsed,
        ComparisonTable {
            rows,
            best_profit_id,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
    }

    fn base() -> ScenarioInputs {
        ScenarioInputs {
            vesting_months: 0,
            cliff_months: 0,
            ..ScenarioInputs::default()
        }
    }

    fn exits() -> Vec<(String, Money)> {
        vec![
            ("Seed".to_string(), dec!(5_000_000)),
            ("Series A".to_string(), dec!(20_000_000)),
            ("Exit 100M".to_string(), dec!(100_000_000)),
        ]
    }

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let o = ScenarioOverrides {
            shares: Some(dec!(2_000)),
            plan_type: Some(PlanType::Phantom),
            ..ScenarioOverrides::default()
        };
        let s = clone_scenario(&base(), Some(&o));
        assert_eq!(s.shares, dec!(2_000));
        assert_eq!(s.plan_type, PlanType::Phantom);
        assert_eq!(s.strike_price, base().strike_price);
        assert_eq!(s.company_valuation, base().company_valuation);
    }

    #[test]
    fn test_clone_without_overrides_is_equal() {
        assert_eq!(clone_scenario(&base(), None), base());
    }

    #[test]
    fn test_exit_scenarios_share_plan() {
        let scenarios = exit_scenarios(&base(), &exits());
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[1].id, "series-a");
        assert_eq!(scenarios[2].id, "exit-100m");
        assert!(scenarios.iter().all(|s| s.inputs.shares == dec!(1000)));
        assert_eq!(scenarios[1].inputs.company_valuation, dec!(20_000_000));
    }

    #[test]
    fn test_rows_follow_valuation() {
        let rows = compare_scenarios(&exit_scenarios(&base(), &exits()), as_of());
        assert_eq!(rows[0].equity_value, dec!(5_000));
        assert_eq!(rows[0].profit, dec!(4_500));
        assert_eq!(rows[2].profit, dec!(99_500));
        // Ownership does not depend on valuation
        assert!(rows.iter().all(|r| r.ownership == dec!(0.1)));
    }

    #[test]
    fn test_run_comparison_picks_best() {
        let out = run_comparison(&exit_scenarios(&base(), &exits()), as_of()).unwrap();
        assert_eq!(out.result.best_profit_id.as_deref(), Some("exit-100m"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_run_comparison_empty_is_error() {
        assert!(run_comparison(&[], as_of()).is_err());
    }

    #[test]
    fn test_run_comparison_names_failing_scenario() {
        let mut scenarios = exit_scenarios(&base(), &exits());
        scenarios[1].inputs.shares = dec!(-1);
        let err = run_comparison(&scenarios, as_of()).unwrap_err();
        assert!(err.to_string().contains("Series A.shares"));
    }

    #[test]
    fn test_run_comparison_flags_duplicates_and_floors() {
        let mut scenarios = exit_scenarios(&base(), &exits());
        scenarios[2].id = scenarios[0].id.clone();
        scenarios[0].inputs.total_shares = Decimal::ZERO;
        let out = run_comparison(&scenarios, as_of()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("duplicate scenario id")));
        assert!(out.warnings.iter().any(|w| w.starts_with("Seed: total_shares")));
    }
}
