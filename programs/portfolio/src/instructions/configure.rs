//! Replace the strategy allocation

use allocator_common::{Address, AllocationEntry, AllocatorError, Registry};

use crate::instructions::sync::process_sync;
use crate::state::{Portfolio, Strategies};

/// Process configure strategies instruction
///
/// Every key must be a strategy the registry recognizes and the engine
/// knows. On success the token cache is re-synced, so a configuration
/// change never leaves the portfolio stale.
///
/// # Errors
/// * `Unauthorized` - caller is not the manager
/// * `InvalidStrategyReference` - a key is not a recognized strategy
/// * `UnknownStrategy` - a recognized key has no ledger
/// * any `AllocationTable::replace` error
pub fn process_configure_strategies(
    portfolio: &mut Portfolio,
    strategies: &Strategies,
    registry: &dyn Registry,
    caller: &Address,
    entries: &[AllocationEntry],
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;

    for entry in entries {
        if !registry.is_recognized_strategy(&entry.key) {
            log::warn!("Portfolio {}: {} is not a recognized strategy", portfolio.id, entry.key);
            return Err(AllocatorError::InvalidStrategyReference(entry.key));
        }
        if !strategies.contains_key(&entry.key) {
            return Err(AllocatorError::UnknownStrategy(entry.key));
        }
    }

    portfolio.allocation.replace(entries)?;
    log::info!(
        "Portfolio {}: strategy allocation replaced ({} strategies)",
        portfolio.id,
        portfolio.allocation.len()
    );

    process_sync(portfolio, strategies)?;
    Ok(())
}
