//! Recompute the utilized-token cache

use std::collections::BTreeSet;

use allocator_common::{AllocatorError, TokenId};

use crate::state::{Fingerprint, Portfolio, Strategies};

/// Process sync instruction
///
/// Rebuilds `utilized_tokens` from the deposit-eligible tokens of every
/// allocated strategy and `payout_tokens` from everything the portfolio can
/// end up holding, then records the new fingerprint. Idempotent and open to
/// any caller.
pub fn process_sync(portfolio: &mut Portfolio, strategies: &Strategies) -> Result<Fingerprint, AllocatorError> {
    let keys = portfolio.strategy_keys();

    let mut utilized: BTreeSet<TokenId> = BTreeSet::new();
    for key in &keys {
        let strategy = strategies.get(key).ok_or(AllocatorError::UnknownStrategy(*key))?;
        utilized.extend(strategy.deposit_tokens());
    }

    let mut payout = utilized.clone();
    for key in portfolio.held_strategies(strategies) {
        let strategy = strategies.get(&key).ok_or(AllocatorError::UnknownStrategy(key))?;
        payout.extend(strategy.withdraw_tokens());
    }
    // Tokens already pulled out of strategies stay payable after a strategy drops them
    payout.extend(
        portfolio
            .payout_tokens
            .iter()
            .filter(|t| portfolio.custody.balance_of(t) > 0)
            .copied(),
    );

    let fingerprint = portfolio.sync.record(&keys, strategies)?;
    portfolio.utilized_tokens = utilized.into_iter().collect();
    portfolio.payout_tokens = payout.into_iter().collect();

    log::info!(
        "Portfolio {}: synced {} utilized / {} payout tokens (fingerprint {})",
        portfolio.id,
        portfolio.utilized_tokens.len(),
        portfolio.payout_tokens.len(),
        &hex::encode(fingerprint)[..16]
    );

    Ok(fingerprint)
}

/// Sync only if the cache is stale; returns whether a sync ran
pub fn process_sync_if_stale(portfolio: &mut Portfolio, strategies: &Strategies) -> Result<bool, AllocatorError> {
    if !portfolio.is_stale(strategies)? {
        return Ok(false);
    }
    process_sync(portfolio, strategies)?;
    Ok(true)
}
