use chrono::{Local, NaiveDateTime};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::product::ProductParameters;
use crate::amortization::schedule::quote_monthly_payment;
use crate::applications::contact::contact_url;
use crate::applications::intake::{validate_application, CreditApplication};
use crate::applications::store::{ApplicationRecord, ApplicationStore};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CreditSimResult;

const NEXT_STEP: &str = "Continúa el proceso por WhatsApp para enviar tus documentos";

/// Acknowledgement returned to the applicant after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application_id: String,
    pub message: String,
    pub estimated_payment: Money,
    pub next_step: String,
    pub contact_url: String,
    pub submitted_at: NaiveDateTime,
}

/// Eight uppercase hex characters.
pub fn new_application_id() -> String {
    format!("{:08X}", rand::thread_rng().gen::<u32>())
}

/// Validate, price and persist an application, then hand back the receipt
/// with the contact deeplink.
///
/// Nothing is written when validation or pricing fails.
pub fn submit_application<S: ApplicationStore>(
    application: &CreditApplication,
    store: &mut S,
    params: &ProductParameters,
) -> CreditSimResult<ComputationOutput<SubmissionReceipt>> {
    let start = Instant::now();

    let mut application = validate_application(application, params)?;
    let submitted_at = *application
        .submitted_at
        .get_or_insert_with(|| Local::now().naive_local());

    let credit = &application.credit;
    let estimated_payment = quote_monthly_payment(
        credit.requested_amount,
        credit.term_months,
        credit.product_type.as_deref(),
        credit.person_type.as_deref(),
        params,
    )?;
    application.credit.computed_payment = Some(estimated_payment);

    let application_id = new_application_id();
    let record = ApplicationRecord::from_application(
        &application_id,
        submitted_at,
        &application,
        estimated_payment,
    );
    store.append(&record)?;
    info!("application {application_id} accepted, estimated payment {estimated_payment}");

    let receipt = SubmissionReceipt {
        message: format!(
            "Solicitud recibida exitosamente. Tu cuota estimada es ${} {}",
            group_thousands(estimated_payment),
            params.currency.code()
        ),
        estimated_payment,
        next_step: NEXT_STEP.to_string(),
        contact_url: contact_url(&application.personal.phone, &application_id),
        application_id,
        submitted_at,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Application intake: validation, contractual payment quote, persistence",
        &serde_json::json!({
            "requested_amount": application.credit.requested_amount.to_string(),
            "term_months": application.credit.term_months,
            "product_type": application.credit.product_type,
        }),
        Vec::new(),
        elapsed,
        receipt,
    ))
}

/// Whole-unit amount with comma thousands separators, e.g. `1,234,567`.
fn group_thousands(amount: Money) -> String {
    let whole = amount.round().abs().trunc().to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount.is_sign_negative() && !amount.round().is_zero() {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_application_id_shape() {
        let id = new_application_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec!(662217)), "662,217");
        assert_eq!(group_thousands(dec!(1234567)), "1,234,567");
        assert_eq!(group_thousands(dec!(999)), "999");
        assert_eq!(group_thousands(dec!(-1000)), "-1,000");
    }
}
