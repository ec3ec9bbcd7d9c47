//! Push portfolio-held tokens into strategies

use allocator_common::{apply_rate, checked_add, Address, Amount, AllocatorError, Registry, StrategyId};

use crate::state::{Portfolio, Strategies};

/// Process strategy deposit instruction (manager only)
///
/// `per_strategy` holds one amount list per strategy key (canonical order),
/// each aligned with that strategy's own `tokens()`. The value pushed to
/// every strategy must match its allocation percentage of the value the
/// portfolio holds in its utilized tokens before the push, so a push always
/// moves the whole uninvested balance. Strategies receiving nothing but
/// zeros are not called.
///
/// # Returns
/// * `(strategy, shares minted)` for every strategy that received tokens
pub fn process_strategy_deposit(
    portfolio: &mut Portfolio,
    strategies: &mut Strategies,
    registry: &dyn Registry,
    caller: &Address,
    per_strategy: &[Vec<Amount>],
    tolerance: u128,
) -> Result<Vec<(StrategyId, u128)>, AllocatorError> {
    log::debug!("PortfolioStrategyDeposit: Starting ({})", portfolio.id);

    portfolio.require_manager(caller)?;

    if !portfolio.deposit_open {
        return Err(AllocatorError::DepositClosed);
    }

    let entries = portfolio.allocation.entries().to_vec();
    if per_strategy.len() != entries.len() {
        return Err(AllocatorError::InvalidLengths);
    }

    let mut values = Vec::with_capacity(entries.len());
    let mut total_value: u128 = 0;
    for (entry, amounts) in entries.iter().zip(per_strategy) {
        let strategy = strategies
            .get(&entry.key)
            .ok_or(AllocatorError::UnknownStrategy(entry.key))?;
        let tokens = strategy.tokens();
        if amounts.len() != tokens.len() {
            return Err(AllocatorError::InvalidLengths);
        }
        let mut value: u128 = 0;
        for (token, amount) in tokens.iter().zip(amounts) {
            if *amount == 0 {
                continue;
            }
            value = checked_add(value, portfolio.valuation.value_of(token, *amount)?)?;
        }
        total_value = checked_add(total_value, value)?;
        values.push(value);
    }

    if total_value == 0 {
        return Err(AllocatorError::ZeroValue);
    }

    let mut held_value: u128 = 0;
    for token in &portfolio.utilized_tokens {
        let held = portfolio.custody.balance_of(token);
        if held != 0 {
            held_value = checked_add(held_value, portfolio.valuation.value_of(token, held)?)?;
        }
    }
    log::debug!(
        "PortfolioStrategyDeposit: pushing {} of {} held value",
        total_value,
        held_value
    );

    for (entry, value) in entries.iter().zip(&values) {
        if !entry.deposit_eligible {
            if *value != 0 {
                return Err(AllocatorError::InvalidStrategyAllocation);
            }
            continue;
        }
        let expected = apply_rate(held_value, entry.percentage)?;
        if !ledger_model::within_tolerance(*value, expected, tolerance) {
            log::warn!(
                "PortfolioStrategyDeposit: strategy {} gets {} but expected {}",
                entry.key,
                value,
                expected
            );
            return Err(AllocatorError::InvalidStrategyAllocation);
        }
    }

    let mut minted = Vec::new();
    for (entry, amounts) in entries.iter().zip(per_strategy) {
        if amounts.iter().all(|a| *a == 0) {
            continue;
        }
        let strategy = strategies
            .get_mut(&entry.key)
            .ok_or(AllocatorError::UnknownStrategy(entry.key))?;
        for (token, amount) in strategy.tokens().into_iter().zip(amounts) {
            portfolio.custody.send(token, *amount, entry.key)?;
        }
        let shares =
            allocator_strategy::process_deposit(strategy, registry, &portfolio.id, amounts, tolerance)?;
        log::debug!(
            "PortfolioStrategyDeposit: {} shares of {} credited",
            shares,
            entry.key
        );
        minted.push((entry.key, shares));
    }

    Ok(minted)
}
