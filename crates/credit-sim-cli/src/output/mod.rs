mod columns;
mod csv_out;
mod minimal;
mod table;

use serde::Serialize;
use serde_json::json;
use std::error::Error;

use credit_sim_core::amortization::rates::GuaranteeTier;
use credit_sim_core::amortization::schedule::{PaymentQuote, ScheduleResult};
use credit_sim_core::applications::store::ApplicationRecord;
use credit_sim_core::applications::submit::SubmissionReceipt;
use credit_sim_core::{ComputationOutput, Money, Rate};

use crate::OutputFormat;

/// What a command hands back for printing.
pub enum Report {
    Schedule(ComputationOutput<ScheduleResult>),
    Quote(ComputationOutput<PaymentQuote>),
    RateSelection(RateSelection),
    Receipt(ComputationOutput<SubmissionReceipt>),
    Applications(ApplicationListing),
    Application(ApplicationRecord),
}

/// Guarantee tier a principal prices at.
#[derive(Debug, Serialize)]
pub struct RateSelection {
    pub principal: Money,
    pub guarantee_tier: GuaranteeTier,
    pub guarantee_rate: Rate,
    pub tier_threshold: Money,
}

/// Every application in one sheet.
#[derive(Debug, Serialize)]
pub struct ApplicationListing {
    pub store: String,
    pub total: usize,
    pub applications: Vec<ApplicationRecord>,
}

impl Report {
    fn warnings(&self) -> &[String] {
        match self {
            Report::Schedule(out) => &out.warnings,
            Report::Quote(out) => &out.warnings,
            Report::Receipt(out) => &out.warnings,
            _ => &[],
        }
    }

    fn methodology(&self) -> Option<&str> {
        match self {
            Report::Schedule(out) => Some(&out.methodology),
            Report::Quote(out) => Some(&out.methodology),
            Report::Receipt(out) => Some(&out.methodology),
            _ => None,
        }
    }
}

pub fn format_output(format: &OutputFormat, report: &Report) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => table::print_table(report),
        OutputFormat::Csv => csv_out::print_csv(report),
        OutputFormat::Minimal => minimal::print_minimal(report),
    }
}

/// Computation envelopes print as-is; plain listings get a `result` wrapper
/// so every command shares one top-level shape.
fn print_json(report: &Report) -> Result<(), Box<dyn Error>> {
    let value = match report {
        Report::Schedule(out) => serde_json::to_value(out)?,
        Report::Quote(out) => serde_json::to_value(out)?,
        Report::Receipt(out) => serde_json::to_value(out)?,
        Report::RateSelection(selection) => json!({ "result": selection }),
        Report::Applications(listing) => json!({ "result": listing }),
        Report::Application(record) => json!({ "result": record }),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
