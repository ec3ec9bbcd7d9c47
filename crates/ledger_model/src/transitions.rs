//! State transition functions - all total, no panics
//!
//! Invalid transitions return the state unchanged.

use crate::math::*;
use crate::state::*;

/// Mint shares to a holder (increases total and balance)
pub fn mint(mut s: ShareBook, holder: u8, shares: u128) -> ShareBook {
    let Some(total) = add_u128(s.shares_total, shares) else {
        return s;
    };

    match s.holdings.iter_mut().find(|h| h.holder == holder) {
        Some(h) => {
            let Some(balance) = add_u128(h.shares, shares) else {
                return s;
            };
            h.shares = balance;
        }
        None => {
            if s.holdings.try_push(Holding { holder, shares }).is_err() {
                return s;
            }
        }
    }

    s.shares_total = total;
    s
}

/// Burn shares from a holder; no-op if the holder has fewer
pub fn burn(mut s: ShareBook, holder: u8, shares: u128) -> ShareBook {
    let Some(idx) = s.holdings.iter().position(|h| h.holder == holder) else {
        return s;
    };
    let Some(balance) = sub_u128(s.holdings[idx].shares, shares) else {
        return s;
    };
    let Some(total) = sub_u128(s.shares_total, shares) else {
        return s;
    };

    s.holdings[idx].shares = balance;
    s.shares_total = total;
    s
}

/// Proportional payout of a custodied balance for burning `shares`
pub fn redeem_amount(s: &ShareBook, shares: u128, balance: u128) -> u128 {
    crate::helpers::pro_rata(balance, shares, s.shares_total).unwrap_or(0)
}
