//! Fixed-point arithmetic helpers - no unwrap, no panics, no silent saturation
//!
//! Every fallible helper returns `None` on overflow or division by zero so the
//! caller decides how to surface it.

use uint::construct_uint;

/// 1.0 in fixed point: one value unit, and also 100%
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Add u128, `None` on overflow
pub fn add_u128(a: u128, b: u128) -> Option<u128> {
    a.checked_add(b)
}

/// Subtract u128, `None` on underflow
pub fn sub_u128(a: u128, b: u128) -> Option<u128> {
    a.checked_sub(b)
}

construct_uint! {
    /// 256-bit intermediate for products of two u128 values
    pub struct U256(4);
}

/// floor(a * b / d) with a 256-bit intermediate
///
/// Returns `None` if `d == 0` or the quotient does not fit in u128.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }

    // Two u128 factors never overflow 256 bits
    let quotient = U256::from(a) * U256::from(b) / U256::from(d);
    if quotient > U256::from(u128::MAX) {
        return None;
    }
    Some(quotient.low_u128())
}

/// Absolute difference
pub fn abs_diff(a: u128, b: u128) -> u128 {
    if a > b { a - b } else { b - a }
}

/// 10^decimals, `None` past u128 range
pub fn pow10(decimals: u8) -> Option<u128> {
    10u128.checked_pow(decimals as u32)
}
