//! Checked fixed-point math on top of `ledger_model::math`

use crate::error::AllocatorError;
use crate::types::{Amount, FixedPoint};

pub use ledger_model::math::ONE;

/// 100% in fixed point
pub const PERCENT_100: FixedPoint = ONE;

/// Default absolute slack for rounding across the two accounting levels
///
/// Used in value units for proportion checks and in token base units for
/// availability checks at withdrawal.
pub const DEFAULT_TOLERANCE: u128 = 10_000;

/// Percentage helper for tests and configs: `percent(25)` is 25%
pub const fn percent(p: u128) -> FixedPoint {
    p * (ONE / 100)
}

#[inline]
pub fn checked_add(a: u128, b: u128) -> Result<u128, AllocatorError> {
    ledger_model::math::add_u128(a, b).ok_or(AllocatorError::MathOverflow)
}

#[inline]
pub fn checked_sub(a: u128, b: u128) -> Result<u128, AllocatorError> {
    ledger_model::math::sub_u128(a, b).ok_or(AllocatorError::MathOverflow)
}

/// floor(a * b / d)
#[inline]
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, AllocatorError> {
    ledger_model::math::mul_div(a, b, d).ok_or(AllocatorError::MathOverflow)
}

/// floor(value * rate / 100%)
#[inline]
pub fn apply_rate(value: u128, rate: FixedPoint) -> Result<u128, AllocatorError> {
    mul_div(value, rate, ONE)
}

/// Sum a list of amounts with overflow checking
pub fn checked_sum<I>(values: I) -> Result<u128, AllocatorError>
where
    I: IntoIterator<Item = Amount>,
{
    values.into_iter().try_fold(0u128, checked_add)
}
