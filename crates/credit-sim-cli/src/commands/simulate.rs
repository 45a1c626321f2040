use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use credit_sim_core::amortization::product::ProductParameters;
use credit_sim_core::amortization::rates::select_guarantee_tier;
use credit_sim_core::amortization::schedule::{self, QuoteRequest, ScheduleRequest};

use crate::input;
use crate::output::{RateSelection, Report};

const MISSING_TERMS: &str = "--principal and --periods are required (or provide --input)";

/// Arguments for a full schedule simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON request file, used when --principal/--periods are absent
    #[arg(long)]
    pub input: Option<String>,

    /// Amount to disburse
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub periods: Option<u32>,

    /// Disbursement date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Product tag, e.g. "libranza" / "payroll-deduction"
    #[arg(long)]
    pub product_type: Option<String>,

    /// Borrower type, e.g. "particular" or "empresa"
    #[arg(long)]
    pub person_type: Option<String>,
}

/// Arguments for a flat payment quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON request file, used when --principal/--periods are absent
    #[arg(long)]
    pub input: Option<String>,

    /// Amount to disburse
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub periods: Option<u32>,

    /// Product tag
    #[arg(long)]
    pub product_type: Option<String>,

    /// Borrower type
    #[arg(long)]
    pub person_type: Option<String>,
}

/// Arguments for guarantee-rate selection
#[derive(Args)]
pub struct SelectRateArgs {
    /// Amount to disburse
    #[arg(long, alias = "amount")]
    pub principal: Decimal,

    /// Product tag
    #[arg(long)]
    pub product_type: Option<String>,

    /// Borrower type
    #[arg(long)]
    pub person_type: Option<String>,
}

pub fn run_simulate(
    args: SimulateArgs,
    params: &ProductParameters,
) -> Result<Report, Box<dyn std::error::Error>> {
    let request: ScheduleRequest = match required_terms(args.principal, args.periods)? {
        Some((principal, periods)) => ScheduleRequest {
            principal,
            periods,
            start_date: args.start_date,
            product_type: args.product_type,
            person_type: args.person_type,
        },
        None => input::read_request(args.input.as_deref(), MISSING_TERMS)?,
    };

    Ok(Report::Schedule(schedule::simulate(&request, params)?))
}

pub fn run_quote(
    args: QuoteArgs,
    params: &ProductParameters,
) -> Result<Report, Box<dyn std::error::Error>> {
    let request: QuoteRequest = match required_terms(args.principal, args.periods)? {
        Some((principal, periods)) => QuoteRequest {
            principal,
            periods,
            product_type: args.product_type,
            person_type: args.person_type,
        },
        None => input::read_request(args.input.as_deref(), MISSING_TERMS)?,
    };

    Ok(Report::Quote(schedule::quote_payment(&request, params)?))
}

pub fn run_select_rate(
    args: SelectRateArgs,
    params: &ProductParameters,
) -> Result<Report, Box<dyn std::error::Error>> {
    let tier = select_guarantee_tier(
        args.principal,
        args.product_type.as_deref(),
        args.person_type.as_deref(),
        params,
    );
    Ok(Report::RateSelection(RateSelection {
        principal: args.principal,
        guarantee_tier: tier,
        guarantee_rate: tier.rate(params),
        tier_threshold: params.tier_threshold,
    }))
}

/// Credit terms given as flags. Flags win over `--input` and piped stdin, so
/// either both terms are present or neither is.
fn required_terms(
    principal: Option<Decimal>,
    periods: Option<u32>,
) -> Result<Option<(Decimal, u32)>, Box<dyn std::error::Error>> {
    match (principal, periods) {
        (Some(principal), Some(periods)) => Ok(Some((principal, periods))),
        (Some(_), None) => Err("--periods is required with --principal".into()),
        (None, Some(_)) => Err("--principal is required with --periods".into()),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_win_when_both_terms_given() {
        let terms = required_terms(Some(Decimal::from(5_000_000)), Some(12)).unwrap();
        assert_eq!(terms, Some((Decimal::from(5_000_000), 12)));
    }

    #[test]
    fn test_no_flags_defers_to_request_document() {
        assert_eq!(required_terms(None, None).unwrap(), None);
    }

    #[test]
    fn test_single_term_flag_is_an_error() {
        assert!(required_terms(Some(Decimal::from(5_000_000)), None).is_err());
        assert!(required_terms(None, Some(12)).is_err());
    }
}
