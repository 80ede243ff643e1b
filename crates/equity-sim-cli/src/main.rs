mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::estimate::EstimateArgs;
use commands::jurisdictions::JurisdictionsArgs;
use commands::scenario::ScenarioArgs;
use commands::tax::TaxArgs;

/// Employee equity scenarios with decimal precision
#[derive(Parser)]
#[command(
    name = "esim",
    version,
    about = "Employee equity scenarios: ownership, vesting and after-tax proceeds",
    long_about = "A CLI for valuing employee stock options and phantom shares under \
                  hypothetical exits. Projects dilution, prorates vesting with a cliff, \
                  and estimates capital gains tax across a catalog of jurisdictions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a grant: share price, ownership, exercise cost, vested profit
    Scenario(ScenarioArgs),
    /// Capital gains tax on a profit in one jurisdiction
    Tax(TaxArgs),
    /// Value a grant and estimate the tax on its profit
    Estimate(EstimateArgs),
    /// Compare labeled scenarios side by side
    Compare(CompareArgs),
    /// List the tax jurisdiction catalog
    Jurisdictions(JurisdictionsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays machine readable. `RUST_LOG` wins over
/// the default level unless `--verbose` is set.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scenario(args) => commands::scenario::run_scenario(args),
        Commands::Tax(args) => commands::tax::run_tax(args),
        Commands::Estimate(args) => commands::estimate::run_estimate(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Jurisdictions(args) => commands::jurisdictions::run_jurisdictions(args),
        Commands::Version => {
            println!("esim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
