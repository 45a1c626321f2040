use std::error::Error;

use super::Report;

/// The one figure each command exists to answer.
pub fn print_minimal(report: &Report) -> Result<(), Box<dyn Error>> {
    let answer = match report {
        Report::Schedule(out) => out.result.monthly_payment.to_string(),
        Report::Quote(out) => out.result.composition.monthly_payment.to_string(),
        Report::RateSelection(selection) => selection.guarantee_rate.to_string(),
        Report::Receipt(out) => out.result.application_id.clone(),
        Report::Applications(listing) => listing.total.to_string(),
        Report::Application(record) => record.application_id.clone(),
    };
    println!("{}", answer);
    Ok(())
}
