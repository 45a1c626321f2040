//! Contractual amortization schedule for guaranteed credits.
//!
//! The first row is a stub period running from the disbursement date to the
//! end of the *following* month. Its interest is prorated on a 30-day month
//! and the principal portion is reduced by the interest the stub did not
//! accrue, so the row charges less than the flat contractual payment. Rows
//! 2..n accrue `days / 30` of a month's interest on the opening balance and
//! the last row repays whatever balance remains.

use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::calendar::{days_between, month_end, next_day, next_month_end};
use crate::amortization::payment::{compose_payment, PaymentComposition};
use crate::amortization::product::ProductParameters;
use crate::amortization::rates::{select_guarantee_tier, GuaranteeTier};
use crate::amortization::rounding::CurrencyRounding;
use crate::error::CreditSimError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CreditSimResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Interest proration basis: every month counts as 30 days.
const DAYS_PER_MONTH: Decimal = dec!(30);
/// Decimal places used when reporting the applied interest rate.
const RATE_DISPLAY_DP: u32 = 4;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Request for a full schedule simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Amount disbursed. Rounded to the currency unit before pricing.
    pub principal: Money,
    /// Number of monthly installments.
    pub periods: u32,
    /// Disbursement date. Today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<String>,
}

/// Request for the flat contractual payment only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub principal: Money,
    pub periods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<String>,
}

/// A single billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based installment number.
    pub period: u32,
    pub start_date: NaiveDate,
    /// End of the disbursement month. Only set on the first row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stub_month_end: Option<NaiveDate>,
    pub end_date: NaiveDate,
    /// "M-YYYY" of the end date.
    pub month_label: String,
    pub usury_rate: Rate,
    /// Base monthly rate, reported to 4 decimal places.
    pub interest_rate: Rate,
    pub days: i64,
    pub opening_balance: Money,
    /// What is actually billed: principal + interest + fee + VAT.
    pub payment_charged: Money,
    pub principal_portion: Money,
    pub guarantee_fee: Money,
    pub guarantee_fee_tax: Money,
    /// Interest to the end of the disbursement month. First row only.
    pub stub_interest: Money,
    /// Interest for regular periods. Zero on the first row.
    pub interest: Money,
    pub closing_balance: Money,
}

/// Column sums over the whole schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub principal: Money,
    pub interest: Money,
    pub guarantee_fee: Money,
    pub guarantee_fee_tax: Money,
    pub charged: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub principal: Money,
    pub periods: u32,
    pub start_date: NaiveDate,
    pub guarantee_tier: GuaranteeTier,
    /// Flat contractual installment (base + guarantee fee + VAT).
    pub monthly_payment: Money,
    pub composition: PaymentComposition,
    pub totals: ScheduleTotals,
    pub notes: String,
    pub schedule: Vec<ScheduleRow>,
}

/// Flat payment quote with the tier it was priced at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub principal: Money,
    pub periods: u32,
    pub guarantee_tier: GuaranteeTier,
    #[serde(flatten)]
    pub composition: PaymentComposition,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the full contractual schedule for a guaranteed credit.
pub fn simulate(
    request: &ScheduleRequest,
    params: &ProductParameters,
) -> CreditSimResult<ComputationOutput<ScheduleResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;
    let rounding = params.rounding()?;
    let principal = validate_terms(request.principal, request.periods, params, &rounding)?;

    let start_date = match request.start_date {
        Some(date) => date,
        None => {
            let today = Local::now().date_naive();
            warnings.push(format!("No start date supplied; using today ({today})"));
            today
        }
    };

    let guarantee_tier = select_guarantee_tier(
        principal,
        request.product_type.as_deref(),
        request.person_type.as_deref(),
        params,
    );
    let composition = compose_payment(
        principal,
        request.periods,
        guarantee_tier.rate(params),
        params,
    )?;

    let schedule = build_schedule(principal, request.periods, start_date, &composition, params)?;
    collect_schedule_warnings(&schedule, &mut warnings);
    let totals = schedule_totals(&schedule);

    debug!(
        "simulated {} periods for principal={} monthly_payment={} tier={:?}",
        request.periods, principal, composition.monthly_payment, guarantee_tier
    );

    let currency = params.currency.code();
    let result = ScheduleResult {
        principal,
        periods: request.periods,
        start_date,
        guarantee_tier,
        monthly_payment: composition.monthly_payment,
        composition,
        totals,
        notes: format!(
            "Amounts in {currency}. 'payment_charged' is what is actually billed: principal + \
             interest + guarantee fee + VAT. The first row includes the interest accrued to the \
             end of the disbursement month. 'monthly_payment' is the contractual installment \
             (guarantee fee and VAT included)."
        ),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French amortization with guarantee fee and VAT; stub interest on a 30-day month",
        &serde_json::json!({
            "base_rate_monthly": params.base_rate_monthly.to_string(),
            "guarantee_rate_monthly": result.composition.guarantee_rate.to_string(),
            "iva_rate": params.iva_rate.to_string(),
            "rounding_unit": params.rounding_unit.to_string(),
            "day_count_basis": "30",
            "product_type": request.product_type,
            "person_type": request.person_type,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Flat contractual monthly payment without building the schedule.
pub fn quote_monthly_payment(
    principal: Money,
    periods: u32,
    product_type: Option<&str>,
    person_type: Option<&str>,
    params: &ProductParameters,
) -> CreditSimResult<Money> {
    params.validate()?;
    let rounding = params.rounding()?;
    let principal = validate_terms(principal, periods, params, &rounding)?;
    let tier = select_guarantee_tier(principal, product_type, person_type, params);
    let composition = compose_payment(principal, periods, tier.rate(params), params)?;
    Ok(composition.monthly_payment)
}

/// Payment quote with its full fee/tax breakdown.
pub fn quote_payment(
    request: &QuoteRequest,
    params: &ProductParameters,
) -> CreditSimResult<ComputationOutput<PaymentQuote>> {
    let start = Instant::now();

    params.validate()?;
    let rounding = params.rounding()?;
    let principal = validate_terms(request.principal, request.periods, params, &rounding)?;
    let guarantee_tier = select_guarantee_tier(
        principal,
        request.product_type.as_deref(),
        request.person_type.as_deref(),
        params,
    );
    let composition = compose_payment(
        principal,
        request.periods,
        guarantee_tier.rate(params),
        params,
    )?;

    let output = PaymentQuote {
        principal,
        periods: request.periods,
        guarantee_tier,
        composition,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level payment at base and guarantee rates; fee = difference, VAT on fee",
        &serde_json::json!({
            "base_rate_monthly": params.base_rate_monthly.to_string(),
            "iva_rate": params.iva_rate.to_string(),
            "tier_threshold": params.tier_threshold.to_string(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Lay out every period for an already-priced credit.
///
/// Pure: the same inputs always produce the same rows.
pub fn build_schedule(
    principal: Money,
    periods: u32,
    start_date: NaiveDate,
    composition: &PaymentComposition,
    params: &ProductParameters,
) -> CreditSimResult<Vec<ScheduleRow>> {
    if periods == 0 {
        return Err(CreditSimError::InvalidPeriodCount {
            periods,
            reason: "At least one period is required".into(),
        });
    }

    let pricing = PeriodPricing {
        rounding: params.rounding()?,
        base_rate: params.base_rate_monthly,
        interest_rate_display: params
            .base_rate_monthly
            .round_dp_with_strategy(RATE_DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero),
        usury_rate: params.usury_rate,
        guarantee_fee: composition.guarantee_fee,
        guarantee_fee_tax: composition.guarantee_fee_tax,
        monthly_payment: composition.monthly_payment,
        periods,
    };

    let first = pricing.first_period(principal, start_date)?;
    let cursor = PeriodCursor {
        balance: first.closing_balance,
        last_end: first.end_date,
    };

    let mut rows = Vec::with_capacity(periods as usize);
    rows.push(first);

    let (rows, _) = (2..=periods).try_fold((rows, cursor), |(mut rows, cursor), period| {
        let row = pricing.regular_period(period, &cursor)?;
        let next = PeriodCursor {
            balance: row.closing_balance,
            last_end: row.end_date,
        };
        rows.push(row);
        Ok::<_, CreditSimError>((rows, next))
    })?;

    Ok(rows)
}

/// Column sums of a schedule.
pub fn schedule_totals(rows: &[ScheduleRow]) -> ScheduleTotals {
    ScheduleTotals {
        principal: rows.iter().map(|r| r.principal_portion).sum(),
        interest: rows.iter().map(|r| r.stub_interest + r.interest).sum(),
        guarantee_fee: rows.iter().map(|r| r.guarantee_fee).sum(),
        guarantee_fee_tax: rows.iter().map(|r| r.guarantee_fee_tax).sum(),
        charged: rows.iter().map(|r| r.payment_charged).sum(),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Running state threaded from one period to the next.
struct PeriodCursor {
    balance: Money,
    last_end: NaiveDate,
}

/// Everything that stays fixed across periods.
struct PeriodPricing {
    rounding: CurrencyRounding,
    base_rate: Rate,
    interest_rate_display: Rate,
    usury_rate: Rate,
    guarantee_fee: Money,
    guarantee_fee_tax: Money,
    monthly_payment: Money,
    periods: u32,
}

impl PeriodPricing {
    fn prorated_interest(&self, balance: Money, days: i64) -> Money {
        self.rounding
            .round(balance * self.base_rate * Decimal::from(days) / DAYS_PER_MONTH)
    }

    fn first_period(&self, balance: Money, start_date: NaiveDate) -> CreditSimResult<ScheduleRow> {
        let stub_month_end = month_end(start_date)?;
        let end_date = next_month_end(start_date)?;
        let stub_days = days_between(start_date, stub_month_end);
        let days = days_between(start_date, end_date);

        let stub_interest = self.prorated_interest(balance, stub_days);
        let full_month_interest = self.prorated_interest(balance, 30);
        let interest_shortfall = self.rounding.round(full_month_interest - stub_interest);
        let adjusted_payment = self.monthly_payment - interest_shortfall;

        let principal_portion = if self.periods == 1 {
            balance
        } else {
            self.rounding
                .round(adjusted_payment - self.guarantee_fee - self.guarantee_fee_tax - stub_interest)
                .max(Decimal::ZERO)
                .min(balance)
        };
        let closing_balance = self.rounding.round(balance - principal_portion);
        let payment_charged = self.rounding.round(
            principal_portion + self.guarantee_fee + self.guarantee_fee_tax + stub_interest,
        );

        Ok(ScheduleRow {
            period: 1,
            start_date,
            stub_month_end: Some(stub_month_end),
            end_date,
            month_label: month_label(end_date),
            usury_rate: self.usury_rate,
            interest_rate: self.interest_rate_display,
            days,
            opening_balance: balance,
            payment_charged,
            principal_portion,
            guarantee_fee: self.guarantee_fee,
            guarantee_fee_tax: self.guarantee_fee_tax,
            stub_interest,
            interest: Decimal::ZERO,
            closing_balance,
        })
    }

    fn regular_period(&self, period: u32, cursor: &PeriodCursor) -> CreditSimResult<ScheduleRow> {
        let balance = cursor.balance;
        let start_date = next_day(cursor.last_end)?;
        let end_date = month_end(start_date)?;
        let days = days_between(start_date, end_date);

        let interest = self.prorated_interest(balance, days);
        let principal_portion = if period == self.periods {
            balance
        } else {
            self.rounding
                .round(self.monthly_payment - self.guarantee_fee - self.guarantee_fee_tax - interest)
                .max(Decimal::ZERO)
        };
        let closing_balance = self.rounding.round(balance - principal_portion);
        let payment_charged = self.rounding.round(
            principal_portion + interest + self.guarantee_fee + self.guarantee_fee_tax,
        );

        Ok(ScheduleRow {
            period,
            start_date,
            stub_month_end: None,
            end_date,
            month_label: month_label(end_date),
            usury_rate: self.usury_rate,
            interest_rate: self.interest_rate_display,
            days,
            opening_balance: balance,
            payment_charged,
            principal_portion,
            guarantee_fee: self.guarantee_fee,
            guarantee_fee_tax: self.guarantee_fee_tax,
            stub_interest: Decimal::ZERO,
            interest,
            closing_balance,
        })
    }
}

fn month_label(date: NaiveDate) -> String {
    format!("{}-{}", date.month(), date.year())
}

/// Check principal and term against the product, returning the principal
/// rounded to the currency unit.
fn validate_terms(
    principal: Money,
    periods: u32,
    params: &ProductParameters,
    rounding: &CurrencyRounding,
) -> CreditSimResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(CreditSimError::InvalidPrincipal(principal.to_string()));
    }
    let rounded = rounding.round(principal);
    if rounded <= Decimal::ZERO {
        return Err(CreditSimError::InvalidPrincipal(format!(
            "{principal} rounds to {rounded}"
        )));
    }
    if periods == 0 || periods > params.max_periods {
        return Err(CreditSimError::InvalidPeriodCount {
            periods,
            reason: format!("Term must be between 1 and {} months", params.max_periods),
        });
    }
    Ok(rounded)
}

fn collect_schedule_warnings(rows: &[ScheduleRow], warnings: &mut Vec<String>) {
    let last = rows.len() as u32;
    for row in rows {
        if row.period < last && row.principal_portion.is_zero() {
            warnings.push(format!(
                "Period {}: installment does not cover interest and fees; no principal repaid",
                row.period
            ));
        }
    }
}
