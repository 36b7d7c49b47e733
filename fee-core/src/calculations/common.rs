//! Common utility functions shared by the profit calculations.
//!
//! This module provides rounding and raw-field parsing used across the
//! worksheet, the validator, and display code.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(11.254)), dec!(11.25));
/// assert_eq!(round_half_up(dec!(11.255)), dec!(11.26));
/// assert_eq!(round_half_up(dec!(-11.255)), dec!(-11.26)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a raw input field into a decimal.
///
/// The value is trimmed first. Returns `None` for an empty or unparseable
/// string; callers decide whether that means "zero" (the engine) or
/// "needs a closer look" (the validator).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::common::parse_decimal_field;
///
/// assert_eq!(parse_decimal_field(" 12.50 "), Some(dec!(12.50)));
/// assert_eq!(parse_decimal_field(""), None);
/// assert_eq!(parse_decimal_field("abc"), None);
/// ```
pub fn parse_decimal_field(raw: &str) -> Option<Decimal> {
    raw.trim().parse::<Decimal>().ok()
}

/// Parses a raw input field, treating empty or unparseable values as zero.
///
/// This is the engine's `parse-or-zero` rule: a half-typed form still
/// produces a finite result, and malformed values are the validator's
/// problem, never the engine's.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use fee_core::calculations::common::parse_or_zero;
///
/// assert_eq!(parse_or_zero("19.99"), dec!(19.99));
/// assert_eq!(parse_or_zero(""), Decimal::ZERO);
/// assert_eq!(parse_or_zero("not a price"), Decimal::ZERO);
/// ```
pub fn parse_or_zero(raw: &str) -> Decimal {
    parse_decimal_field(raw).unwrap_or(Decimal::ZERO)
}
