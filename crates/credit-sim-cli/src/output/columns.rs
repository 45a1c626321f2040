//! Fixed field and column layouts for each report.

use credit_sim_core::amortization::rates::GuaranteeTier;
use credit_sim_core::amortization::schedule::ScheduleRow;
use credit_sim_core::applications::store::SHEET_HEADERS;
use credit_sim_core::CreditSimResult;

use super::Report;

pub const SCHEDULE_COLUMNS: [&str; 16] = [
    "period",
    "start_date",
    "stub_month_end",
    "end_date",
    "month_label",
    "days",
    "interest_rate",
    "usury_rate",
    "opening_balance",
    "principal_portion",
    "stub_interest",
    "interest",
    "guarantee_fee",
    "guarantee_fee_tax",
    "payment_charged",
    "closing_balance",
];

/// Per-row collection attached to a report.
pub struct RowSet {
    pub title: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Field/value pairs in display order.
pub fn summary(report: &Report) -> CreditSimResult<Vec<(&'static str, String)>> {
    let fields = match report {
        Report::Schedule(out) => {
            let r = &out.result;
            vec![
                ("principal", r.principal.to_string()),
                ("periods", r.periods.to_string()),
                ("start_date", r.start_date.to_string()),
                ("guarantee_tier", tier_label(r.guarantee_tier).to_string()),
                ("guarantee_rate", r.composition.guarantee_rate.to_string()),
                ("base_payment", r.composition.base_payment.to_string()),
                ("guarantee_fee", r.composition.guarantee_fee.to_string()),
                ("guarantee_fee_tax", r.composition.guarantee_fee_tax.to_string()),
                ("monthly_payment", r.monthly_payment.to_string()),
                ("total_principal", r.totals.principal.to_string()),
                ("total_interest", r.totals.interest.to_string()),
                ("total_guarantee_fee", r.totals.guarantee_fee.to_string()),
                ("total_guarantee_fee_tax", r.totals.guarantee_fee_tax.to_string()),
                ("total_charged", r.totals.charged.to_string()),
                ("notes", r.notes.clone()),
            ]
        }
        Report::Quote(out) => {
            let q = &out.result;
            let c = &q.composition;
            vec![
                ("principal", q.principal.to_string()),
                ("periods", q.periods.to_string()),
                ("guarantee_tier", tier_label(q.guarantee_tier).to_string()),
                ("guarantee_rate", c.guarantee_rate.to_string()),
                ("base_payment", c.base_payment.to_string()),
                ("payment_with_guarantee", c.payment_with_guarantee.to_string()),
                ("guarantee_fee", c.guarantee_fee.to_string()),
                ("guarantee_fee_tax", c.guarantee_fee_tax.to_string()),
                ("monthly_payment", c.monthly_payment.to_string()),
            ]
        }
        Report::RateSelection(s) => vec![
            ("principal", s.principal.to_string()),
            ("guarantee_tier", tier_label(s.guarantee_tier).to_string()),
            ("guarantee_rate", s.guarantee_rate.to_string()),
            ("tier_threshold", s.tier_threshold.to_string()),
        ],
        Report::Receipt(out) => {
            let r = &out.result;
            vec![
                ("application_id", r.application_id.clone()),
                ("submitted_at", r.submitted_at.to_string()),
                ("estimated_payment", r.estimated_payment.to_string()),
                ("message", r.message.clone()),
                ("next_step", r.next_step.clone()),
                ("contact_url", r.contact_url.clone()),
            ]
        }
        Report::Applications(listing) => vec![
            ("store", listing.store.clone()),
            ("total", listing.total.to_string()),
        ],
        Report::Application(record) => SHEET_HEADERS
            .iter()
            .copied()
            .zip(record.sheet_row()?)
            .collect(),
    };
    Ok(fields)
}

/// Rows for reports that carry a collection: schedule rows, or one sheet row
/// per stored application.
pub fn rows(report: &Report) -> CreditSimResult<Option<RowSet>> {
    let set = match report {
        Report::Schedule(out) => RowSet {
            title: "schedule",
            headers: SCHEDULE_COLUMNS.to_vec(),
            rows: out.result.schedule.iter().map(schedule_cells).collect(),
        },
        Report::Applications(listing) => RowSet {
            title: "applications",
            headers: SHEET_HEADERS.to_vec(),
            rows: listing
                .applications
                .iter()
                .map(|record| record.sheet_row())
                .collect::<CreditSimResult<_>>()?,
        },
        _ => return Ok(None),
    };
    Ok(Some(set))
}

/// Cells of one schedule row in [`SCHEDULE_COLUMNS`] order.
pub fn schedule_cells(row: &ScheduleRow) -> Vec<String> {
    vec![
        row.period.to_string(),
        row.start_date.to_string(),
        row.stub_month_end.map(|d| d.to_string()).unwrap_or_default(),
        row.end_date.to_string(),
        row.month_label.clone(),
        row.days.to_string(),
        row.interest_rate.to_string(),
        row.usury_rate.to_string(),
        row.opening_balance.to_string(),
        row.principal_portion.to_string(),
        row.stub_interest.to_string(),
        row.interest.to_string(),
        row.guarantee_fee.to_string(),
        row.guarantee_fee_tax.to_string(),
        row.payment_charged.to_string(),
        row.closing_balance.to_string(),
    ]
}

fn tier_label(tier: GuaranteeTier) -> &'static str {
    match tier {
        GuaranteeTier::Payroll => "payroll",
        GuaranteeTier::IndividualCompany => "individual_company",
    }
}
