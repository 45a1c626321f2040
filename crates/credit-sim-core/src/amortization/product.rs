use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::rounding::CurrencyRounding;
use crate::error::CreditSimError;
use crate::types::{Currency, Money, Rate};
use crate::CreditSimResult;

/// Monthly base rate, without the guarantee.
pub const DEFAULT_BASE_RATE_MONTHLY: Rate = dec!(0.0183);
/// Monthly all-in rate including the guarantee, payroll-deduction tier.
pub const DEFAULT_PAYROLL_GUARANTEE_RATE: Rate = dec!(0.0705);
/// Monthly all-in rate including the guarantee, individual/company tier.
pub const DEFAULT_INDIVIDUAL_GUARANTEE_RATE: Rate = dec!(0.0565);
/// VAT charged on the guarantee fee.
pub const DEFAULT_IVA_RATE: Rate = dec!(0.19);
/// Principal above which the individual/company tier applies.
pub const DEFAULT_TIER_THRESHOLD: Money = dec!(5_000_000);
/// Regulatory usury ceiling, reported on every schedule row.
pub const DEFAULT_USURY_RATE: Rate = dec!(0.2501);
pub const DEFAULT_MAX_PERIODS: u32 = 60;

/// Fixed product parameters. Loaded once at process start and passed to the
/// engine by reference; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductParameters {
    pub base_rate_monthly: Rate,
    pub payroll_guarantee_rate_monthly: Rate,
    pub individual_guarantee_rate_monthly: Rate,
    pub iva_rate: Rate,
    /// Smallest currency denomination; `1` means whole units only.
    pub rounding_unit: Decimal,
    pub tier_threshold: Money,
    pub max_periods: u32,
    pub usury_rate: Rate,
    pub currency: Currency,
}

impl Default for ProductParameters {
    fn default() -> Self {
        Self {
            base_rate_monthly: DEFAULT_BASE_RATE_MONTHLY,
            payroll_guarantee_rate_monthly: DEFAULT_PAYROLL_GUARANTEE_RATE,
            individual_guarantee_rate_monthly: DEFAULT_INDIVIDUAL_GUARANTEE_RATE,
            iva_rate: DEFAULT_IVA_RATE,
            rounding_unit: Decimal::ONE,
            tier_threshold: DEFAULT_TIER_THRESHOLD,
            max_periods: DEFAULT_MAX_PERIODS,
            usury_rate: DEFAULT_USURY_RATE,
            currency: Currency::COP,
        }
    }
}

impl ProductParameters {
    pub fn rounding(&self) -> CreditSimResult<CurrencyRounding> {
        CurrencyRounding::from_unit(self.rounding_unit)
    }

    /// Reject parameter tables the engine cannot price with.
    pub fn validate(&self) -> CreditSimResult<()> {
        let rates = [
            ("base_rate_monthly", self.base_rate_monthly),
            (
                "payroll_guarantee_rate_monthly",
                self.payroll_guarantee_rate_monthly,
            ),
            (
                "individual_guarantee_rate_monthly",
                self.individual_guarantee_rate_monthly,
            ),
            ("iva_rate", self.iva_rate),
            ("usury_rate", self.usury_rate),
        ];
        for (field, rate) in rates {
            if rate < Decimal::ZERO {
                return Err(CreditSimError::InvalidInput {
                    field: field.into(),
                    reason: "Rate cannot be negative".into(),
                });
            }
        }
        if self.tier_threshold < Decimal::ZERO {
            return Err(CreditSimError::InvalidInput {
                field: "tier_threshold".into(),
                reason: "Tier threshold cannot be negative".into(),
            });
        }
        if self.max_periods == 0 {
            return Err(CreditSimError::InvalidInput {
                field: "max_periods".into(),
                reason: "Product must allow at least one period".into(),
            });
        }
        self.rounding()?;
        Ok(())
    }
}
