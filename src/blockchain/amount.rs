// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-decimal scaling between integer token units and [`Decimal`].

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Errors converting between token units and decimal amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount {0} exceeds the decimal range")]
    Overflow(String),

    #[error("amount must not be negative")]
    Negative,

    #[error("too many decimal places (max {0})")]
    TooPrecise(u8),
}

/// Scale an integer token amount down by `decimals` places.
///
/// Exact: `1_500_000` at 6 decimals is `1.5`. The result is normalized, so
/// trailing zeros of the fraction are not kept.
pub fn units_to_decimal(units: U256, decimals: u8) -> Result<Decimal, AmountError> {
    let raw = i128::try_from(units).map_err(|_| AmountError::Overflow(units.to_string()))?;
    Decimal::try_from_i128_with_scale(raw, u32::from(decimals))
        .map(|d| d.normalize())
        .map_err(|_| AmountError::Overflow(units.to_string()))
}

/// Scale a decimal amount up to integer token units.
pub fn decimal_to_units(amount: Decimal, decimals: u8) -> Result<U256, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }

    let amount = amount.normalize();
    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(AmountError::TooPrecise(decimals));
    }

    // mantissa * 10^(decimals - scale)
    let mantissa = amount.mantissa().unsigned_abs();
    let shift = U256::from(10u64).pow(U256::from(u32::from(decimals) - scale));
    U256::from(mantissa)
        .checked_mul(shift)
        .ok_or_else(|| AmountError::Overflow(amount.to_string()))
}
