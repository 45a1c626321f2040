use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::product::ProductParameters;
use crate::error::CreditSimError;
use crate::types::Money;
use crate::CreditSimResult;

const NAME_MAX_LEN: usize = 120;
const NATIONAL_ID_LEN: (usize, usize) = (7, 15);
const PHONE_LEN: (usize, usize) = (10, 15);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    /// National id (cédula). Digits only once spaces and dashes are removed.
    pub national_id: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInfo {
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDetails {
    pub requested_amount: Money,
    pub term_months: u32,
    /// Filled in on submission with the quoted contractual payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<String>,
}

/// A credit application as submitted by the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditApplication {
    pub personal: PersonalData,
    pub financial: FinancialInfo,
    pub credit: CreditDetails,
    pub accepts_data_processing: bool,
    pub accepts_terms: bool,
    pub accepts_credit_bureau_check: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate an application and return a copy with the national id and phone
/// normalised to digits.
///
/// Length limits apply to the raw values, before normalisation.
pub fn validate_application(
    application: &CreditApplication,
    params: &ProductParameters,
) -> CreditSimResult<CreditApplication> {
    let mut normalised = application.clone();

    validate_personal(&mut normalised.personal)?;
    validate_financial(&normalised.financial)?;
    validate_credit(&normalised.credit, params)?;

    let consents = [
        ("accepts_data_processing", application.accepts_data_processing),
        ("accepts_terms", application.accepts_terms),
        ("accepts_credit_bureau_check", application.accepts_credit_bureau_check),
    ];
    for (field, accepted) in consents {
        if !accepted {
            return Err(invalid(field, "All required consents must be accepted"));
        }
    }

    Ok(normalised)
}

/// Strip spaces and dashes from a national id and require digits only.
pub fn normalize_national_id(raw: &str) -> CreditSimResult<String> {
    let digits = strip_chars(raw, &[' ', '-']);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("national_id", "National id must contain digits only"));
    }
    Ok(digits)
}

/// Strip spaces, dashes, parentheses and `+` from a phone number and require
/// digits only.
pub fn normalize_phone(raw: &str) -> CreditSimResult<String> {
    let digits = strip_chars(raw, &[' ', '-', '(', ')', '+']);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("phone", "Phone must contain digits only"));
    }
    Ok(digits)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_personal(personal: &mut PersonalData) -> CreditSimResult<()> {
    check_len("first_name", &personal.first_name, 1, NAME_MAX_LEN)?;
    check_len("last_name", &personal.last_name, 1, NAME_MAX_LEN)?;
    check_len(
        "national_id",
        &personal.national_id,
        NATIONAL_ID_LEN.0,
        NATIONAL_ID_LEN.1,
    )?;
    check_len("phone", &personal.phone, PHONE_LEN.0, PHONE_LEN.1)?;

    personal.national_id = normalize_national_id(&personal.national_id)?;
    personal.phone = normalize_phone(&personal.phone)?;

    if !looks_like_email(&personal.email) {
        return Err(invalid("email", "Email address is not valid"));
    }
    Ok(())
}

fn validate_financial(financial: &FinancialInfo) -> CreditSimResult<()> {
    if financial.monthly_income <= Decimal::ZERO {
        return Err(invalid("monthly_income", "Monthly income must be positive"));
    }
    if financial.monthly_expenses < Decimal::ZERO {
        return Err(invalid(
            "monthly_expenses",
            "Monthly expenses cannot be negative",
        ));
    }
    Ok(())
}

fn validate_credit(credit: &CreditDetails, params: &ProductParameters) -> CreditSimResult<()> {
    if credit.requested_amount <= Decimal::ZERO {
        return Err(CreditSimError::InvalidPrincipal(
            credit.requested_amount.to_string(),
        ));
    }
    if credit.term_months == 0 || credit.term_months > params.max_periods {
        return Err(CreditSimError::InvalidPeriodCount {
            periods: credit.term_months,
            reason: format!("Term must be between 1 and {} months", params.max_periods),
        });
    }
    Ok(())
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> CreditSimResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(invalid(
            field,
            &format!("Length must be between {min} and {max} characters (got {len})"),
        ));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn strip_chars(raw: &str, strip: &[char]) -> String {
    raw.chars().filter(|c| !strip.contains(c)).collect()
}

fn invalid(field: &str, reason: &str) -> CreditSimError {
    CreditSimError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_id_normalisation() {
        assert_eq!(normalize_national_id("1 020-304 050").unwrap(), "1020304050");
        assert!(normalize_national_id("10203A4050").is_err());
    }

    #[test]
    fn test_phone_normalisation_strips_symbols() {
        assert_eq!(normalize_phone("+57 (300) 123-4567").unwrap(), "573001234567");
        assert!(normalize_phone("300.123.4567").is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ana.perez@example.co"));
        assert!(!looks_like_email("ana.perez@example"));
        assert!(!looks_like_email("@example.co"));
        assert!(!looks_like_email("ana perez@example.co"));
        assert!(!looks_like_email("ana@@example.co"));
    }
}
