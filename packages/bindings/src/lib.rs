use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use equity_sim_core::comparison::{self, exit_scenarios, LabeledScenario};
use equity_sim_core::tax::estimate::{self, TaxBasis};
use equity_sim_core::tax::jurisdictions::{find_in, validate_catalog};
use equity_sim_core::tax::{self, jurisdictions, TaxJurisdiction};
use equity_sim_core::valuation::{self, ScenarioInputs};
use equity_sim_core::{display, Currency};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn evaluation_date(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Resolve a jurisdiction against the caller's catalog, or the built-in one.
fn resolve_jurisdiction(
    catalog: Option<&[TaxJurisdiction]>,
    code: &str,
) -> NapiResult<TaxJurisdiction> {
    let found = match catalog {
        Some(entries) => {
            validate_catalog(entries).map_err(to_napi_error)?;
            find_in(entries, code)
        }
        None => find_in(jurisdictions(), code),
    };
    found.cloned().map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ScenarioBindingInput {
    #[serde(flatten)]
    inputs: ScenarioInputs,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let binding_input: ScenarioBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = valuation::run_scenario(&binding_input.inputs, evaluation_date(binding_input.as_of))
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct TaxBindingInput {
    gross_profit: Decimal,
    jurisdiction: String,
    #[serde(default)]
    custom_rate: Option<Decimal>,
    #[serde(default)]
    catalog: Option<Vec<TaxJurisdiction>>,
}

#[napi]
pub fn calculate_tax(input_json: String) -> NapiResult<String> {
    let input: TaxBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let jurisdiction = resolve_jurisdiction(input.catalog.as_deref(), &input.jurisdiction)?;
    let output = tax::run_tax(input.gross_profit, &jurisdiction, input.custom_rate)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct EstimateBindingInput {
    inputs: ScenarioInputs,
    jurisdiction: String,
    #[serde(default)]
    basis: TaxBasis,
    #[serde(default)]
    custom_rate: Option<Decimal>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
    #[serde(default)]
    catalog: Option<Vec<TaxJurisdiction>>,
}

#[napi]
pub fn estimate_net(input_json: String) -> NapiResult<String> {
    let input: EstimateBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let jurisdiction = resolve_jurisdiction(input.catalog.as_deref(), &input.jurisdiction)?;
    let output = estimate::run_estimate(
        &input.inputs,
        evaluation_date(input.as_of),
        &jurisdiction,
        input.basis,
        input.custom_rate,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// The built-in catalog in display order, with the selector badges.
#[napi]
pub fn list_jurisdictions(currency: Option<String>) -> NapiResult<String> {
    let currency = currency.map(Currency::from).unwrap_or_default();
    let listing: Vec<serde_json::Value> = jurisdictions()
        .iter()
        .map(|j| {
            serde_json::json!({
                "jurisdiction": j,
                "regime_label": j.regime.label(),
                "allowance_label": j.allowance_label(&currency),
                "relief_label": j.relief_label(),
            })
        })
        .collect();
    serde_json::to_string(&listing).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ExitPoint {
    label: String,
    company_valuation: Decimal,
}

#[derive(serde::Deserialize)]
struct CompareBindingInput {
    #[serde(default)]
    scenarios: Vec<LabeledScenario>,
    /// Base grant for `exits`; each exit becomes one extra scenario.
    #[serde(default)]
    base: Option<ScenarioInputs>,
    #[serde(default)]
    exits: Vec<ExitPoint>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let input: CompareBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut scenarios = input.scenarios;
    if let Some(base) = input.base.as_ref() {
        let exits: Vec<(String, Decimal)> = input
            .exits
            .into_iter()
            .map(|e| (e.label, e.company_valuation))
            .collect();
        scenarios.extend(exit_scenarios(base, &exits));
    }
    let output = comparison::run_comparison(&scenarios, evaluation_date(input.as_of))
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[napi]
pub fn format_money(amount: String, currency: String, compact: bool) -> NapiResult<String> {
    let amount: Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(display::format_money(amount, &Currency::from(currency), compact))
}
