//! Shared numeric helpers for area math and whole-unit money

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};

use crate::types::*;

/// Round an area or length for display only; never feed the result back into totals
pub fn round_for_display(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Convert a full-precision cost into whole currency units (half away from zero)
///
/// Fails when the cost is not finite, e.g. after an area product overflowed.
pub fn money_from_f64(value: f64) -> CoreResult<Money> {
    let rounded = value.round();
    if !rounded.is_finite() {
        return Err(CoreError::Validation(format!(
            "Cost {} is out of range",
            value
        )));
    }
    BigDecimal::from_f64(rounded)
        .ok_or_else(|| CoreError::Validation(format!("Cost {} is out of range", value)))
}

/// Convert a catalog price into a float for area math
pub fn money_to_f64(amount: &Money) -> CoreResult<f64> {
    amount
        .to_f64()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CoreError::Validation(format!("Amount {} is out of range", amount)))
}

/// Clamp a percentage into [0, 100]
pub fn clamp_percent(percent: &BigDecimal) -> BigDecimal {
    let zero = BigDecimal::from(0);
    let hundred = BigDecimal::from(100);
    if *percent < zero {
        zero
    } else if *percent > hundred {
        hundred
    } else {
        percent.clone()
    }
}

/// `part / whole * 100`, or 0 when `whole` is zero
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Larger of `amount` and zero
pub fn floor_at_zero(amount: Money) -> Money {
    let zero = BigDecimal::from(0);
    if amount < zero {
        zero
    } else {
        amount
    }
}
