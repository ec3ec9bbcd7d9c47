//! Pull tokens out of strategies into portfolio custody

use allocator_common::{Address, Amount, AllocatorError, Registry, StrategyId, TokenId};

use crate::instructions::sync::process_sync_if_stale;
use crate::instructions::withdraw::receive_all;
use crate::state::{Portfolio, Strategies};

/// Process strategy withdraw instruction (manager only)
///
/// `shares` aligns with `held_strategies()`; zero entries are skipped. The
/// token cache is re-synced first when a strategy's allocation moved, so
/// tokens a strategy starts paying out are tracked for payout.
///
/// # Returns
/// * Tokens received per strategy
pub fn process_strategy_withdraw(
    portfolio: &mut Portfolio,
    strategies: &mut Strategies,
    registry: &dyn Registry,
    caller: &Address,
    shares: &[u128],
) -> Result<Vec<(StrategyId, Vec<(TokenId, Amount)>)>, AllocatorError> {
    log::debug!("PortfolioStrategyWithdraw: Starting ({})", portfolio.id);

    portfolio.require_manager(caller)?;

    if process_sync_if_stale(portfolio, strategies)? {
        log::debug!("PortfolioStrategyWithdraw: token cache re-synced");
    }

    let held = portfolio.held_strategies(strategies);
    if shares.len() != held.len() {
        return Err(AllocatorError::InvalidLength {
            expected: held.len(),
            actual: shares.len(),
        });
    }

    let mut received = Vec::new();
    for (key, burn) in held.into_iter().zip(shares) {
        if *burn == 0 {
            continue;
        }
        let strategy = strategies.get_mut(&key).ok_or(AllocatorError::UnknownStrategy(key))?;
        let paid = allocator_strategy::process_withdraw(strategy, registry, &portfolio.id, *burn, &portfolio.id)?;
        receive_all(portfolio.custody.as_mut(), key, &paid)?;
        log::debug!("PortfolioStrategyWithdraw: burned {} shares of {}", burn, key);
        received.push((key, paid));
    }

    // A fully exited strategy can drop out of `held_strategies`; keep its tokens payable
    crate::instructions::sync::process_sync(portfolio, strategies)?;

    Ok(received)
}
