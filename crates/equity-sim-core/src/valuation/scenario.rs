use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::EquitySimError;
use crate::math::{is_saturated, sat_div, sat_mul, sat_sub};
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Percent, Shares};
use crate::valuation::dilution::{dilute_pool, ownership_pct};
use crate::valuation::vesting::{vesting_status, VestingPhase};
use crate::EquitySimResult;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Kind of equity plan the grant belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    /// Real options with an exercise (strike) cost.
    #[default]
    Esop,
    /// Cash-settled units tracking share value. No exercise cost.
    Phantom,
}

/// One grant/valuation hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    /// Options or units held.
    pub shares: Shares,
    /// Exercise price per share. Ignored for phantom plans.
    #[serde(default)]
    pub strike_price: Money,
    /// Hypothetical exit valuation of the whole company.
    pub company_valuation: Money,
    /// Fully diluted share count at grant time.
    pub total_shares: Shares,
    #[serde(default)]
    pub plan_type: PlanType,
    /// Date of grant. Without it no vesting proration happens.
    #[serde(default)]
    pub grant_date: Option<NaiveDate>,
    /// Length of the vesting schedule; 0 means fully vested.
    #[serde(default)]
    pub vesting_months: u32,
    /// Months before anything vests.
    #[serde(default)]
    pub cliff_months: u32,
    /// Projected dilution from future rounds, 0–99%.
    #[serde(default)]
    pub expected_dilution: Percent,
    /// Display currency. Never converted.
    #[serde(default)]
    pub currency: Currency,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            shares: dec!(1000),
            strike_price: dec!(0.5),
            company_valuation: dec!(10_000_000),
            total_shares: dec!(1_000_000),
            plan_type: PlanType::Esop,
            grant_date: None,
            vesting_months: 48,
            cliff_months: 12,
            expected_dilution: Decimal::ZERO,
            currency: Currency::EUR,
        }
    }
}

impl ScenarioInputs {
    /// Boundary checks for callers that want strict input. The calculator
    /// itself accepts anything and lets the arithmetic run.
    pub fn validate(&self) -> EquitySimResult<()> {
        let non_negative = [
            ("shares", self.shares),
            ("strike_price", self.strike_price),
            ("company_valuation", self.company_valuation),
            ("total_shares", self.total_shares),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EquitySimError::InvalidInput {
                    field: field.into(),
                    reason: "Must be zero or positive".into(),
                });
            }
        }
        if self.expected_dilution < Decimal::ZERO || self.expected_dilution > dec!(100) {
            return Err(EquitySimError::InvalidInput {
                field: "expected_dilution".into(),
                reason: "Dilution must be a percentage between 0 and 100".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Everything derived from one `ScenarioInputs` at one evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResults {
    /// Exit valuation / diluted pool.
    pub share_price: Money,
    /// Value of all granted shares at the exit price.
    pub equity_value: Money,
    /// Strike cost of exercising the whole grant (0 for phantom).
    pub cost_to_exercise: Money,
    /// Gross profit, floored at zero.
    pub profit: Money,
    /// Post-dilution ownership %.
    pub ownership: Percent,
    /// Ownership % against the pool at grant time.
    pub original_ownership: Percent,
    /// Pool after the projected round.
    pub diluted_total_shares: Shares,
    pub vested_percentage: Percent,
    pub vested_shares: Shares,
    pub vested_equity_value: Money,
    pub vested_cost: Money,
    /// Profit on vested shares, floored at zero.
    pub vested_profit: Money,
    /// Calendar months since grant, when a schedule applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_elapsed: Option<i64>,
}

/// One slice of the profit/cost split consumed by chart renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSlice {
    pub name: String,
    pub value: Money,
}

impl ScenarioResults {
    /// True when any money figure hit the edge of the decimal range.
    pub fn is_saturated(&self) -> bool {
        [
            self.share_price,
            self.equity_value,
            self.cost_to_exercise,
            self.vested_equity_value,
            self.vested_cost,
        ]
        .into_iter()
        .any(is_saturated)
    }

    /// Net profit against exercise cost.
    pub fn breakdown(&self) -> Vec<BreakdownSlice> {
        vec![
            BreakdownSlice {
                name: "Net Profit".into(),
                value: self.profit,
            },
            BreakdownSlice {
                name: "Exercise Cost".into(),
                value: self.cost_to_exercise,
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Value a grant at `as_of`. Infallible and deterministic: non-positive pools
/// are floored to 1, dilution is clamped to [0, 99], and profits are floored
/// at zero. Figures past the decimal range saturate at `Decimal::MAX`.
pub fn calculate_scenario(inputs: &ScenarioInputs, as_of: NaiveDate) -> ScenarioResults {
    let pool = dilute_pool(inputs.total_shares, inputs.expected_dilution);

    let original_ownership = ownership_pct(inputs.shares, pool.effective_total_shares);
    let ownership = ownership_pct(inputs.shares, pool.diluted_total_shares);
    let share_price = sat_div(inputs.company_valuation, pool.diluted_total_shares);

    let is_phantom = inputs.plan_type == PlanType::Phantom;
    let exercise_cost = |shares: Shares| {
        if is_phantom {
            Decimal::ZERO
        } else {
            sat_mul(shares, inputs.strike_price)
        }
    };

    let equity_value = sat_mul(inputs.shares, share_price);
    let cost_to_exercise = exercise_cost(inputs.shares);
    let profit = sat_sub(equity_value, cost_to_exercise).max(Decimal::ZERO);

    let vesting = vesting_status(
        inputs.grant_date,
        inputs.vesting_months,
        inputs.cliff_months,
        as_of,
    );
    let vested_shares = sat_div(sat_mul(inputs.shares, vesting.vested_percentage), dec!(100));
    let vested_equity_value = sat_mul(vested_shares, share_price);
    let vested_cost = exercise_cost(vested_shares);
    let vested_profit = sat_sub(vested_equity_value, vested_cost).max(Decimal::ZERO);

    debug!(
        %share_price,
        %ownership,
        vested_pct = %vesting.vested_percentage,
        phase = ?vesting.phase,
        "scenario valued"
    );

    ScenarioResults {
        share_price,
        equity_value,
        cost_to_exercise,
        profit,
        ownership,
        original_ownership,
        diluted_total_shares: pool.diluted_total_shares,
        vested_percentage: vesting.vested_percentage,
        vested_shares,
        vested_equity_value,
        vested_cost,
        vested_profit,
        months_elapsed: vesting.months_elapsed,
    }
}

/// Validate, value, and wrap in the standard envelope with warnings for
/// every defensive adjustment the calculator made.
pub fn run_scenario(
    inputs: &ScenarioInputs,
    as_of: NaiveDate,
) -> EquitySimResult<ComputationOutput<ScenarioResults>> {
    let start = Instant::now();
    inputs.validate()?;

    let result = calculate_scenario(inputs, as_of);

    let mut warnings = scenario_warnings(inputs, as_of);
    if result.is_saturated() {
        warnings.push("figures exceed the decimal range; saturated values reported".into());
    }
    for w in &warnings {
        warn!("{w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equity Scenario Valuation (single-round dilution, linear vesting with cliff)",
        &serde_json::json!({
            "plan_type": inputs.plan_type,
            "expected_dilution": inputs.expected_dilution.to_string(),
            "grant_date": inputs.grant_date.map(|d| d.to_string()),
            "vesting_months": inputs.vesting_months,
            "cliff_months": inputs.cliff_months,
            "as_of": as_of.to_string(),
            "currency": inputs.currency.code(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Warnings for the adjustments `calculate_scenario` applies silently.
pub fn scenario_warnings(inputs: &ScenarioInputs, as_of: NaiveDate) -> Vec<String> {
    let mut warnings = Vec::new();
    let pool = dilute_pool(inputs.total_shares, inputs.expected_dilution);

    if pool.pool_floored {
        warnings.push(format!(
            "total_shares ({}) is not positive; treated as 1",
            inputs.total_shares
        ));
    }
    if pool.dilution_clamped {
        warnings.push(format!(
            "expected_dilution ({}%) clamped to {}%",
            inputs.expected_dilution, pool.applied_dilution
        ));
    }
    if inputs.shares > pool.effective_total_shares {
        warnings.push("shares exceed the fully diluted pool; ownership is above 100%".into());
    }
    if inputs.plan_type == PlanType::Phantom && !inputs.strike_price.is_zero() {
        warnings.push("strike_price ignored for phantom plans".into());
    }
    if inputs.vesting_months > 0 && inputs.cliff_months > inputs.vesting_months {
        warnings.push(format!(
            "cliff ({} months) is longer than the vesting period ({} months)",
            inputs.cliff_months, inputs.vesting_months
        ));
    }
    if let Some(grant) = inputs.grant_date {
        if grant > as_of {
            warnings.push(format!("grant_date {grant} is after the evaluation date {as_of}"));
        }
    }
    let status = vesting_status(
        inputs.grant_date,
        inputs.vesting_months,
        inputs.cliff_months,
        as_of,
    );
    if inputs.vesting_months > 0 && status.phase == VestingPhase::Unscheduled {
        warnings.push("no grant_date supplied; grant treated as fully vested".into());
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
