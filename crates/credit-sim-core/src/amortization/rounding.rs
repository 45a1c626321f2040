use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CreditSimError;
use crate::types::Money;
use crate::CreditSimResult;

/// Fixed arithmetic policy for stored amounts: quantize to the scale of the
/// currency's rounding unit, ties away from zero.
///
/// A unit of `1` rounds to whole pesos, `0.01` to cents. Units must be a
/// power of ten no larger than one; trailing zeros are ignored, so `1.0` is
/// whole pesos. Every intermediate figure that ends up in a schedule goes
/// through [`CurrencyRounding::round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyRounding {
    decimal_places: u32,
}

impl CurrencyRounding {
    pub fn from_unit(unit: Decimal) -> CreditSimResult<Self> {
        if unit <= Decimal::ZERO {
            return Err(CreditSimError::InvalidInput {
                field: "rounding_unit".into(),
                reason: "Rounding unit must be positive".into(),
            });
        }
        let unit = unit.normalize();
        if unit.mantissa() != 1 {
            return Err(CreditSimError::InvalidInput {
                field: "rounding_unit".into(),
                reason: format!("Rounding unit must be 1, 0.1, 0.01, ... (got {unit})"),
            });
        }
        Ok(Self {
            decimal_places: unit.scale(),
        })
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    pub fn round(&self, value: Decimal) -> Money {
        value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}
