mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::applications::{ApplicationsArgs, ApplyArgs};
use commands::simulate::{QuoteArgs, SelectRateArgs, SimulateArgs};

/// Guaranteed-credit simulator
#[derive(Parser)]
#[command(
    name = "csim",
    version,
    about = "Guaranteed-credit simulator",
    long_about = "Simulates contractual amortization schedules for credits sold with a \
                  third-party guarantee fee (aval) and VAT on that fee, quotes flat monthly \
                  payments, and records credit applications in a CSV sheet."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON or YAML file overriding the built-in product parameters
    #[arg(long, global = true)]
    product_config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the full amortization schedule
    Simulate(SimulateArgs),
    /// Quote the flat contractual monthly payment
    Quote(QuoteArgs),
    /// Show which guarantee tier and rate a credit prices at
    SelectRate(SelectRateArgs),
    /// Validate, quote and store a credit application
    Apply(ApplyArgs),
    /// Browse stored applications
    Applications(ApplicationsArgs),
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

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<output::Report, Box<dyn std::error::Error>> =
        config::load_product_parameters(cli.product_config.as_deref()).and_then(|params| {
            match cli.command {
                Commands::Simulate(args) => commands::simulate::run_simulate(args, &params),
                Commands::Quote(args) => commands::simulate::run_quote(args, &params),
                Commands::SelectRate(args) => commands::simulate::run_select_rate(args, &params),
                Commands::Apply(args) => commands::applications::run_apply(args, &params),
                Commands::Applications(args) => commands::applications::run_applications(args),
                Commands::Version => {
                    println!("csim {}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
            }
        });

    match result.and_then(|report| output::format_output(&cli.output, &report)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
