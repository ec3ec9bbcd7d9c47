//! Burn strategy shares and pay out custodied tokens pro rata

use allocator_common::{mul_div, Address, Amount, AllocatorError, Registry, TokenId};

use crate::state::Strategy;

/// Process withdraw instruction
///
/// Pays `floor(shares * balance_t / shares_total)` of every
/// withdraw-eligible token `t` to `recipient`, based on the custodied
/// balance at entry. Balance gained outside deposits (rewards) is therefore
/// shared by every holder; deposit-only tokens are never returned.
///
/// # Returns
/// * `(token, amount)` pairs in canonical order, zero amounts included
pub fn process_withdraw(
    strategy: &mut Strategy,
    registry: &dyn Registry,
    caller: &Address,
    shares: u128,
    recipient: &Address,
) -> Result<Vec<(TokenId, Amount)>, AllocatorError> {
    log::debug!("StrategyWithdraw: Starting ({})", strategy.id);

    if !registry.is_recognized_portfolio(caller) {
        log::warn!("StrategyWithdraw: caller {} is not a recognized portfolio", caller);
        return Err(AllocatorError::Unauthorized(*caller));
    }

    if !strategy.withdraw_open {
        return Err(AllocatorError::WithdrawClosed);
    }

    if shares == 0 {
        return Err(AllocatorError::ZeroAmount);
    }

    if shares > strategy.shares_of(caller) {
        return Err(AllocatorError::InsufficientShares);
    }

    let shares_total = strategy.shares_total;
    let payouts = strategy
        .allocation
        .withdraw_keys()
        .map(|token| {
            let balance = strategy.custody.balance_of(&token);
            mul_div(shares, balance, shares_total).map(|amount| (token, amount))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (token, amount) in &payouts {
        strategy.custody.send(*token, *amount, *recipient)?;
    }

    strategy.burn(*caller, shares)?;

    log::debug!(
        "StrategyWithdraw: burned {} shares from {} (remaining total {})",
        shares,
        caller,
        strategy.shares_total
    );

    Ok(payouts)
}
