use log::debug;
use serde::{Deserialize, Serialize};

use crate::amortization::product::ProductParameters;
use crate::types::{Money, Rate};

/// Product tag of the dedicated payroll-linked credit.
pub const PAYROLL_DEDUCTION_TAG: &str = "payroll-deduction";
/// Commercial name of the payroll-linked credit, accepted as an alias.
pub const LIBRANZA_TAG: &str = "libranza";

/// Guarantee-fee tier applied to a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeTier {
    /// Payroll-deduction product, or any principal at or below the threshold.
    Payroll,
    /// Individuals and companies borrowing above the threshold.
    IndividualCompany,
}

impl GuaranteeTier {
    pub fn rate(self, params: &ProductParameters) -> Rate {
        match self {
            GuaranteeTier::Payroll => params.payroll_guarantee_rate_monthly,
            GuaranteeTier::IndividualCompany => params.individual_guarantee_rate_monthly,
        }
    }
}

/// True when the product tag names the payroll-deduction credit.
/// Matching is trimmed and case-insensitive; absent or blank tags never match.
pub fn is_payroll_deduction(product_type: Option<&str>) -> bool {
    match product_type.map(str::trim) {
        Some(tag) if !tag.is_empty() => {
            tag.eq_ignore_ascii_case(PAYROLL_DEDUCTION_TAG) || tag.eq_ignore_ascii_case(LIBRANZA_TAG)
        }
        _ => false,
    }
}

/// Pick the guarantee tier for a credit. The payroll-deduction product always
/// prices at the payroll tier; everything else switches to the lower
/// individual/company tier strictly above the principal threshold.
///
/// `person_type` does not influence the tier; it is only logged.
pub fn select_guarantee_tier(
    principal: Money,
    product_type: Option<&str>,
    person_type: Option<&str>,
    params: &ProductParameters,
) -> GuaranteeTier {
    let tier = if is_payroll_deduction(product_type) {
        GuaranteeTier::Payroll
    } else if principal > params.tier_threshold {
        GuaranteeTier::IndividualCompany
    } else {
        GuaranteeTier::Payroll
    };
    debug!(
        "guarantee tier {:?} for principal={} product_type={:?} person_type={:?}",
        tier, principal, product_type, person_type
    );
    tier
}

/// Monthly all-in rate (base + guarantee) to feed the payment formula.
pub fn select_guarantee_rate(
    principal: Money,
    product_type: Option<&str>,
    person_type: Option<&str>,
    params: &ProductParameters,
) -> Rate {
    select_guarantee_tier(principal, product_type, person_type, params).rate(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_large_individual_credit_gets_lower_tier() {
        let p = ProductParameters::default();
        let rate = select_guarantee_rate(dec!(6_000_000), Some("particular"), None, &p);
        assert_eq!(rate, p.individual_guarantee_rate_monthly);
    }

    #[test]
    fn test_small_individual_credit_gets_payroll_tier() {
        let p = ProductParameters::default();
        let rate = select_guarantee_rate(dec!(4_000_000), Some("particular"), None, &p);
        assert_eq!(rate, p.payroll_guarantee_rate_monthly);
    }

    #[test]
    fn test_threshold_itself_stays_on_payroll_tier() {
        let p = ProductParameters::default();
        let tier = select_guarantee_tier(dec!(5_000_000), None, None, &p);
        assert_eq!(tier, GuaranteeTier::Payroll);
        let tier = select_guarantee_tier(dec!(5_000_001), None, None, &p);
        assert_eq!(tier, GuaranteeTier::IndividualCompany);
    }

    #[test]
    fn test_payroll_product_ignores_principal() {
        let p = ProductParameters::default();
        for tag in ["Libranza", "  LIBRANZA ", "payroll-deduction", "Payroll-Deduction"] {
            let rate = select_guarantee_rate(dec!(50_000_000), Some(tag), Some("empresa"), &p);
            assert_eq!(rate, p.payroll_guarantee_rate_monthly, "tag {tag:?}");
        }
    }

    #[test]
    fn test_blank_tags_are_not_payroll() {
        assert!(!is_payroll_deduction(None));
        assert!(!is_payroll_deduction(Some("")));
        assert!(!is_payroll_deduction(Some("   ")));
        assert!(!is_payroll_deduction(Some("payroll")));
    }
}
