//! Conversion between raw on-chain integers and `Decimal` values.
//!
//! On-chain amounts are unsigned integers scaled by `10^decimals`. `Decimal`
//! carries a 96-bit mantissa and a scale of at most 28, which covers every
//! realistic ERC-20 balance exactly. Amounts wider than the mantissa are
//! rounded to fewer fractional digits; the integer part is never dropped.

use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;

/// Largest scale a `Decimal` supports.
pub const MAX_DECIMALS: u8 = 28;

fn max_mantissa() -> U256 {
    U256::from(Decimal::MAX.mantissa().unsigned_abs())
}

/// Converts a raw amount scaled by `10^decimals` into a decimal value.
///
/// Amounts wider than the 96-bit mantissa drop fractional digits, rounding
/// half to even on what is dropped.
///
/// # Errors
/// Returns `UnsupportedDecimals` when `decimals > 28`, and `AmountOverflow` when
/// the integer part alone exceeds the decimal range.
pub fn to_decimal(raw: U256, decimals: u8) -> Result<Decimal, DomainError> {
    if decimals > MAX_DECIMALS {
        return Err(DomainError::UnsupportedDecimals(decimals));
    }

    let limit = max_mantissa();
    let overflow = || DomainError::AmountOverflow(raw.to_string());
    let mut dropped = 0u32;

    let mantissa = loop {
        let mantissa = round_half_even(raw, dropped);
        if mantissa <= limit {
            break mantissa;
        }
        if dropped == u32::from(decimals) {
            return Err(overflow());
        }
        dropped += 1;
    };

    // mantissa <= 2^96 - 1 here, so the cast cannot wrap.
    let scale = u32::from(decimals) - dropped;
    Decimal::try_from_i128_with_scale(mantissa.low_u128() as i128, scale).map_err(|_| overflow())
}

/// `value / 10^digits`, rounded half to even.
fn round_half_even(value: U256, digits: u32) -> U256 {
    if digits == 0 {
        return value;
    }
    let divisor = U256::exp10(digits as usize);
    let (quotient, remainder) = value.div_mod(divisor);
    let half = divisor / U256::from(2u8);
    if remainder > half || (remainder == half && quotient.bit(0)) {
        quotient + U256::one()
    } else {
        quotient
    }
}

/// Scales a decimal value back into a raw on-chain integer.
///
/// Fractional digits beyond `decimals` are rounded away.
///
/// # Errors
/// Returns `InvalidAmount` for negative values and `UnsupportedDecimals` when
/// `decimals > 28`.
pub fn from_decimal(value: Decimal, decimals: u8) -> Result<U256, DomainError> {
    if decimals > MAX_DECIMALS {
        return Err(DomainError::UnsupportedDecimals(decimals));
    }
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::InvalidAmount(value.to_string()));
    }

    let mut scaled = value;
    scaled.rescale(u32::from(decimals));

    // rescale stops early when the mantissa would overflow; finish in U256.
    let missing = u32::from(decimals).saturating_sub(scaled.scale());
    let mantissa = U256::from(scaled.mantissa().unsigned_abs());

    mantissa
        .checked_mul(U256::exp10(missing as usize))
        .ok_or_else(|| DomainError::AmountOverflow(value.to_string()))
}

/// Returns the larger of two values.
pub fn max(a: Decimal, b: Decimal) -> Decimal {
    if b > a { b } else { a }
}

/// Returns the smaller of two values.
pub fn min(a: Decimal, b: Decimal) -> Decimal {
    if b < a { b } else { a }
}

/// Divides `numerator` by `denominator`.
///
/// # Errors
/// Returns `DivisionByZero` for a zero denominator and `AmountOverflow` when the
/// quotient is out of range.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Result<Decimal, DomainError> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| DomainError::AmountOverflow(format!("{numerator} / {denominator}")))
}
