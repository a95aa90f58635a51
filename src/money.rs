//! Wage arithmetic helpers.
//!
//! All calculations are done with `Decimal`; amounts are converted to `f64`
//! only at the storage boundary, rounded to two decimal places.

use rust_decimal::prelude::*;

use crate::error::{LedgerError, LedgerResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Read a stored amount. Non-finite values collapse to zero.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(round_money)
        .unwrap_or_else(|| {
            tracing::warn!(value, "Non-finite amount read from storage, using 0");
            Decimal::ZERO
        })
}

/// Convert an amount for storage, rounded to 2 decimal places.
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Payment amounts and wage rates must be non-negative.
pub fn validate_amount(amount: Decimal, field_name: &str) -> LedgerResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "{field_name} must be non-negative, got {amount}"
        )));
    }
    Ok(round_money(amount))
}
