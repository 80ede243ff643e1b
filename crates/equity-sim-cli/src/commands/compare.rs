use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use equity_sim_core::comparison::{self, exit_scenarios, LabeledScenario};
use equity_sim_core::EquitySimError;

use super::scenario::GrantArgs;
use crate::input;

/// Arguments for a side-by-side scenario comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CompareArgs {
    #[command(flatten)]
    pub grant: GrantArgs,

    /// Exit to compare against the base grant, as LABEL=VALUATION (repeatable)
    #[arg(long = "exit", value_name = "LABEL=VALUATION")]
    pub exits: Vec<String>,

    /// Path to JSON or YAML list of labeled scenarios (overrides flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let as_of = args.grant.evaluation_date()?;
    let scenarios: Vec<LabeledScenario> = match input::read_input(args.input.as_deref())? {
        Some(list) => list,
        None => {
            if args.exits.is_empty() {
                return Err(
                    "--exit LABEL=VALUATION (repeatable) or --input <file> required for compare"
                        .into(),
                );
            }
            let base = args.grant.to_inputs()?;
            let exits = args
                .exits
                .iter()
                .map(|raw| parse_exit(raw))
                .collect::<Result<Vec<_>, _>>()?;

            let mut list = vec![LabeledScenario {
                id: "current".into(),
                label: "Current".into(),
                editable: false,
                inputs: base.clone(),
            }];
            list.extend(exit_scenarios(&base, &exits));
            list
        }
    };

    let result = comparison::run_comparison(&scenarios, as_of)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_exit(raw: &str) -> Result<(String, Decimal), EquitySimError> {
    let invalid = |reason: &str| EquitySimError::InvalidInput {
        field: "exit".into(),
        reason: format!("'{raw}': {reason}"),
    };
    let (label, valuation) = raw
        .split_once('=')
        .ok_or_else(|| invalid("expected LABEL=VALUATION"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(invalid("label is empty"));
    }
    let valuation: Decimal = valuation
        .trim()
        .parse()
        .map_err(|_| invalid("valuation is not a number"))?;
    Ok((label.to_string(), valuation))
}
