use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use equity_sim_core::display::{format_money, format_percent};
use equity_sim_core::valuation::{self, PlanType, ScenarioInputs, ScenarioResults};
use equity_sim_core::{Currency, EquitySimError};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlanArg {
    Esop,
    Phantom,
}

impl From<PlanArg> for PlanType {
    fn from(p: PlanArg) -> Self {
        match p {
            PlanArg::Esop => PlanType::Esop,
            PlanArg::Phantom => PlanType::Phantom,
        }
    }
}

/// Grant and exit parameters shared by `scenario`, `estimate` and `compare`.
#[derive(Args)]
pub struct GrantArgs {
    /// Options or phantom units held
    #[arg(long, default_value = "1000")]
    pub shares: Decimal,

    /// Exercise price per share (ignored for phantom plans)
    #[arg(long, default_value = "0.5")]
    pub strike_price: Decimal,

    /// Hypothetical exit valuation of the company
    #[arg(long, alias = "company-valuation", default_value = "10000000")]
    pub valuation: Decimal,

    /// Fully diluted share count at grant time
    #[arg(long, default_value = "1000000")]
    pub total_shares: Decimal,

    /// Plan type
    #[arg(long, value_enum, default_value = "esop")]
    pub plan: PlanArg,

    /// Grant date (YYYY-MM-DD); without it the grant counts as fully vested
    #[arg(long)]
    pub grant_date: Option<String>,

    /// Length of the vesting schedule in months (0 = fully vested)
    #[arg(long, default_value = "48")]
    pub vesting_months: u32,

    /// Cliff in months
    #[arg(long, default_value = "12")]
    pub cliff_months: u32,

    /// Expected dilution from future rounds, in percent (0-99)
    #[arg(long, default_value = "0")]
    pub dilution: Decimal,

    /// Display currency code (EUR, USD, GBP, ...)
    #[arg(long, default_value = "EUR")]
    pub currency: String,

    /// Evaluation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,
}

impl GrantArgs {
    pub fn to_inputs(&self) -> Result<ScenarioInputs, EquitySimError> {
        Ok(ScenarioInputs {
            shares: self.shares,
            strike_price: self.strike_price,
            company_valuation: self.valuation,
            total_shares: self.total_shares,
            plan_type: self.plan.into(),
            grant_date: self
                .grant_date
                .as_deref()
                .map(|d| parse_date("grant-date", d))
                .transpose()?,
            vesting_months: self.vesting_months,
            cliff_months: self.cliff_months,
            expected_dilution: self.dilution,
            currency: Currency::from(self.currency.clone()),
        })
    }

    pub fn evaluation_date(&self) -> Result<NaiveDate, EquitySimError> {
        match self.as_of.as_deref() {
            Some(d) => parse_date("as-of", d),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }

    /// File or stdin input if given, otherwise the flags.
    pub fn resolve(
        &self,
        input_path: Option<&str>,
    ) -> Result<ScenarioInputs, Box<dyn std::error::Error>> {
        match input::read_input::<ScenarioInputs>(input_path)? {
            Some(inputs) => Ok(inputs),
            None => Ok(self.to_inputs()?),
        }
    }
}

pub fn parse_date(flag: &str, raw: &str) -> Result<NaiveDate, EquitySimError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| EquitySimError::DateError(format!("--{flag} '{raw}': {e}")))
}

/// Arguments for a single scenario valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub grant: GrantArgs,

    /// Show amounts in compact notation (€10M) in the summary
    #[arg(long)]
    pub compact: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.grant.resolve(args.input.as_deref())?;
    let as_of = args.grant.evaluation_date()?;

    let output = valuation::run_scenario(&inputs, as_of)?;
    let summary = summary(&output.result, &inputs.currency, args.compact);
    let breakdown = output.result.breakdown();

    let mut value = serde_json::to_value(output)?;
    if let Value::Object(ref mut map) = value {
        map.insert("summary".into(), summary);
        map.insert("breakdown".into(), serde_json::to_value(breakdown)?);
    }
    Ok(value)
}

/// Display strings for the headline figures.
pub fn summary(r: &ScenarioResults, currency: &Currency, compact: bool) -> Value {
    let money = |amount: Decimal| format_money(amount, currency, compact);
    json!({
        "share_price": format_money(r.share_price, currency, false),
        "equity_value": money(r.equity_value),
        "cost_to_exercise": money(r.cost_to_exercise),
        "profit": money(r.profit),
        "ownership": format_percent(r.ownership, 3),
        "original_ownership": format_percent(r.original_ownership, 3),
        "vested": format_percent(r.vested_percentage, 1),
        "vested_profit": money(r.vested_profit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        grant: GrantArgs,
    }

    #[test]
    fn test_flag_defaults_match_reference_grant() {
        let h = Harness::parse_from(["esim"]);
        let inputs = h.grant.to_inputs().unwrap();
        assert_eq!(inputs, ScenarioInputs::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let h = Harness::parse_from([
            "esim",
            "--shares",
            "2500",
            "--plan",
            "phantom",
            "--grant-date",
            "2024-03-01",
            "--currency",
            "usd",
        ]);
        let inputs = h.grant.to_inputs().unwrap();
        assert_eq!(inputs.shares, dec!(2500));
        assert_eq!(inputs.plan_type, PlanType::Phantom);
        assert_eq!(inputs.grant_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(inputs.currency, Currency::USD);
    }

    #[test]
    fn test_bad_date_names_flag() {
        let err = parse_date("grant-date", "01/03/2024").unwrap_err();
        assert!(err.to_string().contains("--grant-date"));
    }

    #[test]
    fn test_summary_strings() {
        let inputs = ScenarioInputs {
            vesting_months: 0,
            ..ScenarioInputs::default()
        };
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let r = valuation::calculate_scenario(&inputs, as_of);
        let s = summary(&r, &Currency::EUR, false);
        assert_eq!(s["profit"], "€9,500");
        assert_eq!(s["ownership"], "0.100%");
        assert_eq!(s["vested"], "100.0%");
    }
}
