//! Invariant checking helpers

use crate::math::*;
use crate::state::*;

/// Share conservation: total equals the sum of all balances
pub fn shares_conserved<I>(shares_total: u128, balances: I) -> bool
where
    I: IntoIterator<Item = u128>,
{
    let mut sum: u128 = 0;
    for balance in balances {
        match add_u128(sum, balance) {
            Some(next) => sum = next,
            None => return false,
        }
    }
    sum == shares_total
}

/// Share conservation over the reference book
pub fn book_conserved(book: &ShareBook) -> bool {
    shares_conserved(book.shares_total, book.holdings.iter().map(|h| h.shares))
}

/// Allocation sum: deposit-eligible percentages add up to exactly 100%,
/// or there are no entries at all
///
/// Items are `(deposit_eligible, percentage)`.
pub fn allocation_total_ok<I>(entries: I) -> bool
where
    I: IntoIterator<Item = (bool, u128)>,
{
    let mut count = 0usize;
    let mut sum: u128 = 0;
    for (deposit_eligible, percentage) in entries {
        count += 1;
        if !deposit_eligible {
            continue;
        }
        match add_u128(sum, percentage) {
            Some(next) => sum = next,
            None => return false,
        }
    }
    count == 0 || sum == ONE
}

/// Dilutive fee split
///
/// Manager and governance parts are floored; the depositor gets the
/// remainder so the three parts always add up to `value` exactly.
/// `None` if the rates add up to more than 100%.
pub fn fee_split(value: u128, manager_rate: u128, governance_rate: u128) -> Option<FeeSplit> {
    if add_u128(manager_rate, governance_rate)? > ONE {
        return None;
    }
    let manager = mul_div(value, manager_rate, ONE)?;
    let governance = mul_div(value, governance_rate, ONE)?;
    let depositor = sub_u128(sub_u128(value, manager)?, governance)?;
    Some(FeeSplit { depositor, manager, governance })
}

/// `actual` is within `tolerance` of `expected` in either direction
pub fn within_tolerance(actual: u128, expected: u128, tolerance: u128) -> bool {
    abs_diff(actual, expected) <= tolerance
}

/// floor(part / whole * amount), zero when `whole` is zero
pub fn pro_rata(amount: u128, part: u128, whole: u128) -> Option<u128> {
    if whole == 0 {
        return Some(0);
    }
    mul_div(amount, part, whole)
}
