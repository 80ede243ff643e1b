use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use equity_sim_core::tax;

use super::jurisdictions::{load_catalog, select};

/// Arguments for a capital gains tax calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TaxArgs {
    /// Gross profit to tax
    #[arg(long)]
    pub profit: Decimal,

    /// Jurisdiction code (ES, IE, DE, FR, GB, OTHER)
    #[arg(long, short, default_value = "ES")]
    pub jurisdiction: String,

    /// Rate in percent, only honoured for the OTHER jurisdiction
    #[arg(long)]
    pub custom_rate: Option<Decimal>,

    /// Path to a JSON or YAML catalog replacing the built-in list
    #[arg(long)]
    pub catalog: Option<String>,
}

pub fn run_tax(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let jurisdiction = select(&catalog, &args.jurisdiction)?;
    let result = tax::run_tax(args.profit, &jurisdiction, args.custom_rate)?;
    Ok(serde_json::to_value(result)?)
}
