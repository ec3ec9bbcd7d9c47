//! End-user withdrawal from a portfolio

use std::collections::BTreeMap;

use allocator_common::{
    checked_add, mul_div, Address, Amount, AllocatorError, Interactor, Registry, StrategyId, TokenId,
};

use crate::state::{Portfolio, Strategies};

/// Tokens owed for burning `shares` of `shares_total`
///
/// Per token: `floor(shares * underlying / shares_total)`, where the
/// underlying amount is what the portfolio holds directly plus its pro-rata
/// claim on every held strategy's withdraw-eligible custody.
pub fn entitlements(
    portfolio: &Portfolio,
    strategies: &Strategies,
    shares: u128,
) -> Result<BTreeMap<TokenId, Amount>, AllocatorError> {
    let mut underlying: BTreeMap<TokenId, Amount> = BTreeMap::new();
    for token in &portfolio.payout_tokens {
        underlying.insert(*token, portfolio.custody.balance_of(token));
    }

    for key in portfolio.held_strategies(strategies) {
        let strategy = strategies.get(&key).ok_or(AllocatorError::UnknownStrategy(key))?;
        let held = strategy.shares_of(&portfolio.id);
        if held == 0 {
            continue;
        }
        for token in strategy.withdraw_tokens() {
            let claim = mul_div(held, strategy.balance_of(&token), strategy.shares_total())?;
            let slot = underlying.entry(token).or_insert(0);
            *slot = checked_add(*slot, claim)?;
        }
    }

    underlying
        .into_iter()
        .map(|(token, amount)| Ok((token, mul_div(shares, amount, portfolio.shares_total)?)))
        .collect()
}

/// Burn `shares / shares_total` of every held strategy position into portfolio custody
fn pull_pro_rata(
    portfolio: &mut Portfolio,
    strategies: &mut Strategies,
    registry: &dyn Registry,
    shares: u128,
) -> Result<(), AllocatorError> {
    for key in portfolio.held_strategies(strategies) {
        let strategy = strategies.get_mut(&key).ok_or(AllocatorError::UnknownStrategy(key))?;
        let burn = mul_div(shares, strategy.shares_of(&portfolio.id), portfolio.shares_total)?;
        if burn == 0 {
            continue;
        }
        let paid = allocator_strategy::process_withdraw(strategy, registry, &portfolio.id, burn, &portfolio.id)?;
        receive_all(portfolio.custody.as_mut(), key, &paid)?;
        log::debug!("PortfolioWithdraw: pulled {} shares of {}", burn, key);
    }
    Ok(())
}

pub(crate) fn receive_all(
    custody: &mut dyn Interactor,
    from: StrategyId,
    paid: &[(TokenId, Amount)],
) -> Result<(), AllocatorError> {
    for (token, amount) in paid {
        custody.receive(*token, *amount, from)?;
    }
    Ok(())
}

/// Match entitlements against what the portfolio holds
///
/// A shortfall of up to `tolerance` base units per token is absorbed by
/// capping the payout at the held balance. Anything larger fails with
/// `TokenNotAvailable`, or `InsufficientTokenBalance` in full mode where the
/// tokens should already have been pulled.
pub(crate) fn capped_payouts(
    portfolio: &Portfolio,
    owed: BTreeMap<TokenId, Amount>,
    tolerance: u128,
) -> Result<Vec<(TokenId, Amount)>, AllocatorError> {
    let mut payouts = Vec::with_capacity(owed.len());
    for (token, entitled) in owed {
        let held = portfolio.custody.balance_of(&token);
        if checked_add(held, tolerance)? < entitled {
            log::warn!(
                "PortfolioWithdraw: token {} entitled {} but only {} held",
                token,
                entitled,
                held
            );
            return Err(if portfolio.withdraw_full_mode {
                AllocatorError::InsufficientTokenBalance(token)
            } else {
                AllocatorError::TokenNotAvailable(token)
            });
        }
        payouts.push((token, entitled.min(held)));
    }
    Ok(payouts)
}

/// Process portfolio withdraw instruction
///
/// Two-phase mode pays out of tokens the portfolio already holds and fails
/// with `TokenNotAvailable` when the manager has not pulled enough out of
/// strategies yet. Full mode first burns the proportional slice of every
/// held strategy position in the same call. Either way a shortfall up to
/// `tolerance` base units per token is absorbed and the payout is capped at
/// what is held.
///
/// # Returns
/// * `(token, amount)` paid to the caller, canonical order
pub fn process_withdraw(
    portfolio: &mut Portfolio,
    strategies: &mut Strategies,
    registry: &dyn Registry,
    caller: &Address,
    shares: u128,
    tolerance: u128,
) -> Result<Vec<(TokenId, Amount)>, AllocatorError> {
    log::debug!("PortfolioWithdraw: Starting ({})", portfolio.id);

    if !portfolio.withdraw_open {
        return Err(AllocatorError::WithdrawClosed);
    }

    if shares == 0 {
        return Err(AllocatorError::ZeroAmount);
    }

    if shares > portfolio.shares_of(caller) {
        return Err(AllocatorError::InsufficientShares);
    }

    if portfolio.is_stale(strategies)? {
        log::warn!("PortfolioWithdraw: {} is stale", portfolio.id);
        return Err(AllocatorError::SyncRequired);
    }

    let owed = entitlements(portfolio, strategies, shares)?;

    if portfolio.withdraw_full_mode {
        pull_pro_rata(portfolio, strategies, registry, shares)?;
    }

    let payouts = capped_payouts(portfolio, owed, tolerance)?;

    for (token, amount) in &payouts {
        portfolio.custody.send(*token, *amount, *caller)?;
    }

    portfolio.burn(*caller, shares)?;

    log::debug!(
        "PortfolioWithdraw: burned {} shares from {} (remaining total {})",
        shares,
        caller,
        portfolio.shares_total
    );

    Ok(payouts)
}
