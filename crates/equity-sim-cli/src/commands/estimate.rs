use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use equity_sim_core::display::{format_money, format_percent};
use equity_sim_core::tax::estimate::{self, TaxBasis};

use super::jurisdictions::{load_catalog, select};
use super::scenario::{summary, GrantArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasisArg {
    /// Profit on the whole grant
    Total,
    /// Profit on what has vested by the evaluation date
    Vested,
}

impl From<BasisArg> for TaxBasis {
    fn from(b: BasisArg) -> Self {
        match b {
            BasisArg::Total => TaxBasis::Total,
            BasisArg::Vested => TaxBasis::Vested,
        }
    }
}

/// Arguments for a valuation followed by a tax estimate
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub grant: GrantArgs,

    /// Jurisdiction code (ES, IE, DE, FR, GB, OTHER)
    #[arg(long, short, default_value = "ES")]
    pub jurisdiction: String,

    /// Which profit to tax
    #[arg(long, value_enum, default_value = "total")]
    pub basis: BasisArg,

    /// Rate in percent, only honoured for the OTHER jurisdiction
    #[arg(long)]
    pub custom_rate: Option<Decimal>,

    /// Path to a JSON or YAML catalog replacing the built-in list
    #[arg(long)]
    pub catalog: Option<String>,

    /// Path to JSON or YAML scenario input (overrides grant flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_estimate(args: EstimateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.grant.resolve(args.input.as_deref())?;
    let as_of = args.grant.evaluation_date()?;
    let catalog = load_catalog(args.catalog.as_deref())?;
    let jurisdiction = select(&catalog, &args.jurisdiction)?;

    let output = estimate::run_estimate(
        &inputs,
        as_of,
        &jurisdiction,
        args.basis.into(),
        args.custom_rate,
    )?;

    let currency = &inputs.currency;
    let mut display = summary(&output.result.scenario, currency, false);
    if let Value::Object(ref mut map) = display {
        let est = &output.result.estimate;
        map.insert("tax_paid".into(), format_money(est.tax.tax_paid, currency, false).into());
        map.insert(
            "net_after_tax".into(),
            format_money(est.tax.net_after_tax, currency, false).into(),
        );
        map.insert(
            "effective_rate".into(),
            format_percent(est.tax.effective_rate, 2).into(),
        );
    }

    let mut value = serde_json::to_value(output)?;
    if let Value::Object(ref mut map) = value {
        map.insert("summary".into(), display);
    }
    Ok(value)
}
