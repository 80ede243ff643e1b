use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::EquitySimError;
use crate::math::{sat_add, sat_div, sat_mul, sat_sub};
use crate::tax::jurisdictions::{TaxJurisdiction, TaxRegime};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EquitySimResult;

/// Tax owed on a gain in one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_profit: Money,
    /// Base after allowance and discount; what the rates were applied to.
    pub taxable_amount: Money,
    pub tax_paid: Money,
    /// Gross profit minus tax. The allowance never adds back here.
    pub net_after_tax: Money,
    /// Tax as a percentage of gross profit; 0 when there is no profit.
    pub effective_rate: Percent,
}

/// Tax a gain. Allowance first, then the ESOP discount, then either the
/// custom rate (if given), the bracket ladder, or the flat rate.
///
/// Losses are not refunded: a gross profit at or below zero pays nothing.
pub fn calculate_tax(
    gross_profit: Money,
    jurisdiction: &TaxJurisdiction,
    custom_rate: Option<Percent>,
) -> TaxResult {
    let after_allowance =
        sat_sub(gross_profit, jurisdiction.tax_free_allowance).max(Decimal::ZERO);
    let retained = sat_sub(Decimal::ONE, sat_div(jurisdiction.esop_discount, dec!(100)));
    let taxable_amount = sat_mul(after_allowance, retained);

    let tax_paid = match (custom_rate, &jurisdiction.regime) {
        (Some(rate), _) => apply_rate(taxable_amount, rate),
        (None, TaxRegime::Progressive { .. }) => {
            progressive_tax(taxable_amount, &jurisdiction.regime)
        }
        (None, TaxRegime::FlatRate { rate }) => apply_rate(taxable_amount, *rate),
    };

    let effective_rate = if gross_profit > Decimal::ZERO {
        sat_mul(sat_div(tax_paid, gross_profit), dec!(100))
    } else {
        Decimal::ZERO
    };

    debug!(
        jurisdiction = %jurisdiction.code,
        %gross_profit,
        %taxable_amount,
        %tax_paid,
        custom = custom_rate.is_some(),
        "tax computed"
    );

    TaxResult {
        gross_profit,
        taxable_amount,
        tax_paid,
        net_after_tax: sat_sub(gross_profit, tax_paid),
        effective_rate,
    }
}

/// `amount * rate%`, saturating. The rate is scaled first so a base near the
/// top of the range still yields a proportional tax.
fn apply_rate(amount: Money, rate: Percent) -> Money {
    sat_mul(amount, sat_div(rate, dec!(100)))
}

/// Walk the ladder from the bottom, taxing each band's slice of the base.
fn progressive_tax(taxable: Money, regime: &TaxRegime) -> Money {
    bracket_breakdown(taxable, regime)
        .iter()
        .fold(Decimal::ZERO, |total, s| sat_add(total, s.tax))
}

/// Per-bracket contribution, for display of how the ladder was consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Percent,
    pub amount_taxed: Money,
    pub tax: Money,
}

/// The ladder walk broken down by band. Empty for flat regimes.
pub fn bracket_breakdown(taxable: Money, regime: &TaxRegime) -> Vec<BracketSlice> {
    let TaxRegime::Progressive { brackets } = regime else {
        return Vec::new();
    };
    let mut remaining = taxable;
    let mut previous_upper = Decimal::ZERO;
    let mut slices = Vec::new();

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let in_bracket = match bracket.up_to {
            Some(upper) => remaining.min(sat_sub(upper, previous_upper)),
            None => remaining,
        };
        slices.push(BracketSlice {
            lower: previous_upper,
            upper: bracket.up_to,
            rate: bracket.rate,
            amount_taxed: in_bracket,
            tax: apply_rate(in_bracket, bracket.rate),
        });
        remaining = sat_sub(remaining, in_bracket);
        if let Some(upper) = bracket.up_to {
            previous_upper = upper;
        }
    }

    slices
}

/// Result of `run_tax`: the figures plus the band-by-band walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxComputation {
    pub jurisdiction: String,
    #[serde(flatten)]
    pub tax: TaxResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brackets: Vec<BracketSlice>,
}

/// Validate the custom rate, compute tax, and wrap the result.
///
/// A custom rate is only honoured for the custom jurisdiction; for any other
/// entry it is dropped with a warning.
pub fn run_tax(
    gross_profit: Money,
    jurisdiction: &TaxJurisdiction,
    custom_rate: Option<Percent>,
) -> EquitySimResult<ComputationOutput<TaxComputation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rate = applicable_custom_rate(jurisdiction, custom_rate, &mut warnings)?;
    if gross_profit <= Decimal::ZERO {
        warnings.push("No gain to tax; losses are not refunded".into());
    }
    for w in &warnings {
        warn!("{w}");
    }

    let tax = calculate_tax(gross_profit, jurisdiction, rate);
    let brackets = if rate.is_some() {
        Vec::new()
    } else {
        bracket_breakdown(tax.taxable_amount, &jurisdiction.regime)
    };

    let output = TaxComputation {
        jurisdiction: jurisdiction.code.clone(),
        tax,
        brackets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital Gains Tax (allowance, ESOP discount, flat or progressive rates)",
        &serde_json::json!({
            "jurisdiction": jurisdiction.code,
            "regime": jurisdiction.regime.label(),
            "tax_free_allowance": jurisdiction.tax_free_allowance.to_string(),
            "esop_discount": jurisdiction.esop_discount.to_string(),
            "custom_rate": rate.map(|r| r.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Gate a user-supplied rate: valid range, and only for the custom entry.
pub fn applicable_custom_rate(
    jurisdiction: &TaxJurisdiction,
    custom_rate: Option<Percent>,
    warnings: &mut Vec<String>,
) -> EquitySimResult<Option<Percent>> {
    let Some(rate) = custom_rate else {
        return Ok(None);
    };
    if rate < Decimal::ZERO || rate > dec!(100) {
        return Err(EquitySimError::InvalidInput {
            field: "custom_rate".into(),
            reason: "Custom rate must be between 0 and 100".into(),
        });
    }
    if !jurisdiction.is_custom() {
        warnings.push(format!(
            "custom_rate ignored: {} has a fixed regime",
            jurisdiction.code
        ));
        return Ok(None);
    }
    Ok(Some(rate))
}
