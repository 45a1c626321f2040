use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::amortization::product::ProductParameters;
use crate::amortization::rounding::CurrencyRounding;
use crate::error::CreditSimError;
use crate::types::{Money, Rate};
use crate::CreditSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Breakdown of the flat contractual payment into base installment,
/// guarantee fee and VAT on the fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentComposition {
    /// Level payment at the base rate (no guarantee).
    pub base_payment: Money,
    /// Level payment at the all-in rate including the guarantee.
    pub payment_with_guarantee: Money,
    pub guarantee_rate: Rate,
    /// Monthly guarantee fee: difference between the two level payments.
    pub guarantee_fee: Money,
    /// VAT on the guarantee fee.
    pub guarantee_fee_tax: Money,
    /// base + fee + tax.
    pub monthly_payment: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level payment that amortizes `principal` over `periods` at monthly rate
/// `rate` (French system), rounded to the currency unit.
///
/// A zero rate is straight-line: `principal / periods`.
pub fn level_payment(
    principal: Money,
    rate: Rate,
    periods: u32,
    rounding: &CurrencyRounding,
) -> CreditSimResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(CreditSimError::InvalidPrincipal(principal.to_string()));
    }
    if periods == 0 {
        return Err(CreditSimError::InvalidPeriodCount {
            periods,
            reason: "At least one period is required".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(CreditSimError::InvalidInput {
            field: "rate".into(),
            reason: "Monthly rate cannot be negative".into(),
        });
    }

    let n = Decimal::from(periods);
    if rate.is_zero() {
        return Ok(rounding.round(principal / n));
    }

    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| CreditSimError::InvalidInput {
            field: "rate".into(),
            reason: format!("(1 + {rate})^{periods} overflows decimal precision"),
        })?;
    // 1 - (1 + i)^-n
    let annuity_denominator = Decimal::ONE - Decimal::ONE / growth;

    Ok(rounding.round(principal * rate / annuity_denominator))
}

/// Compose the contractual monthly payment from the base level payment and the
/// guarantee fee implied by `guarantee_rate`. Each step is rounded before it
/// feeds the next one.
pub fn compose_payment(
    principal: Money,
    periods: u32,
    guarantee_rate: Rate,
    params: &ProductParameters,
) -> CreditSimResult<PaymentComposition> {
    let rounding = params.rounding()?;

    let base_payment = level_payment(principal, params.base_rate_monthly, periods, &rounding)?;
    let payment_with_guarantee = level_payment(principal, guarantee_rate, periods, &rounding)?;
    let guarantee_fee = rounding.round(payment_with_guarantee - base_payment);
    let guarantee_fee_tax = rounding.round(guarantee_fee * params.iva_rate);
    let monthly_payment = rounding.round(base_payment + guarantee_fee + guarantee_fee_tax);

    Ok(PaymentComposition {
        base_payment,
        payment_with_guarantee,
        guarantee_rate,
        guarantee_fee,
        guarantee_fee_tax,
        monthly_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pesos() -> CurrencyRounding {
        CurrencyRounding::from_unit(Decimal::ONE).unwrap()
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let a = level_payment(dec!(1_200_000), Decimal::ZERO, 12, &pesos()).unwrap();
        assert_eq!(a, dec!(100_000));
    }

    #[test]
    fn test_zero_rate_rounds_remainder() {
        // 1,000,000 / 3 = 333,333.33
        let a = level_payment(dec!(1_000_000), Decimal::ZERO, 3, &pesos()).unwrap();
        assert_eq!(a, dec!(333_333));
    }

    #[test]
    fn test_level_payment_base_rate() {
        // Exact closed form: 467,875.6487...
        let a = level_payment(dec!(5_000_000), dec!(0.0183), 12, &pesos()).unwrap();
        assert_eq!(a, dec!(467_876));
    }

    #[test]
    fn test_level_payment_single_period_repays_with_one_month_interest() {
        let a = level_payment(dec!(1_000_000), dec!(0.02), 1, &pesos()).unwrap();
        assert_eq!(a, dec!(1_020_000));
    }

    #[test]
    fn test_level_payment_rejects_bad_preconditions() {
        assert!(matches!(
            level_payment(Decimal::ZERO, dec!(0.01), 12, &pesos()),
            Err(CreditSimError::InvalidPrincipal(_))
        ));
        assert!(matches!(
            level_payment(dec!(100), dec!(0.01), 0, &pesos()),
            Err(CreditSimError::InvalidPeriodCount { .. })
        ));
        assert!(matches!(
            level_payment(dec!(100), dec!(-0.01), 12, &pesos()),
            Err(CreditSimError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_compose_payment_rounds_each_step() {
        let params = ProductParameters::default();
        let c = compose_payment(dec!(5_000_000), 12, dec!(0.0705), &params).unwrap();
        assert_eq!(c.base_payment, dec!(467_876));
        assert_eq!(c.payment_with_guarantee, dec!(631_188));
        assert_eq!(c.guarantee_fee, dec!(163_312));
        // 163,312 * 0.19 = 31,029.28
        assert_eq!(c.guarantee_fee_tax, dec!(31_029));
        assert_eq!(c.monthly_payment, dec!(662_217));
    }
}
