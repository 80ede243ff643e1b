use clap::Args;
use serde_json::{json, Value};
use std::borrow::Cow;

use equity_sim_core::tax::jurisdictions::{find_in, validate_catalog};
use equity_sim_core::tax::{jurisdictions, TaxJurisdiction};
use equity_sim_core::Currency;

use crate::input;

/// Arguments for listing the jurisdiction catalog
#[derive(Args)]
pub struct JurisdictionsArgs {
    /// Currency used for allowance labels
    #[arg(long, default_value = "EUR")]
    pub currency: String,

    /// Path to a JSON or YAML catalog replacing the built-in list
    #[arg(long)]
    pub catalog: Option<String>,
}

/// The built-in catalog, or a validated user catalog from `path`.
pub fn load_catalog(
    path: Option<&str>,
) -> Result<Cow<'static, [TaxJurisdiction]>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let catalog: Vec<TaxJurisdiction> = input::file::read_input_file(path)?;
            validate_catalog(&catalog)?;
            tracing::debug!(entries = catalog.len(), path, "user catalog loaded");
            Ok(Cow::Owned(catalog))
        }
        None => Ok(Cow::Borrowed(jurisdictions())),
    }
}

/// Look `code` up in the chosen catalog.
pub fn select(
    catalog: &[TaxJurisdiction],
    code: &str,
) -> Result<TaxJurisdiction, Box<dyn std::error::Error>> {
    Ok(find_in(catalog, code)?.clone())
}

pub fn run_jurisdictions(args: JurisdictionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let currency = Currency::from(args.currency);
    let rows: Vec<Value> = catalog.iter().map(|j| listing_row(j, &currency)).collect();
    Ok(Value::Array(rows))
}

fn listing_row(j: &TaxJurisdiction, currency: &Currency) -> Value {
    json!({
        "code": j.code,
        "name": j.name,
        "flag": j.flag,
        "regime": j.regime.label(),
        "allowance": j.allowance_label(currency).unwrap_or_else(|| "-".into()),
        "relief": j.relief_label().unwrap_or_else(|| "-".into()),
        "notes": j.notes,
    })
}
