//! Strategy configuration: token allocation, custody and valuation
//!
//! All three may only change while both deposits and withdrawals are
//! closed.

use std::sync::Arc;

use allocator_common::{Address, AllocationEntry, AllocatorError, Interactor, ValuationAdapter};

use crate::state::Strategy;

pub(crate) fn require_owner(strategy: &Strategy, caller: &Address) -> Result<(), AllocatorError> {
    if caller != &strategy.owner {
        log::warn!("Strategy {}: caller {} is not the owner", strategy.id, caller);
        return Err(AllocatorError::Unauthorized(*caller));
    }
    Ok(())
}

fn require_configurable(strategy: &Strategy) -> Result<(), AllocatorError> {
    if !strategy.is_configurable() {
        return Err(AllocatorError::TransfersOpen);
    }
    Ok(())
}

/// Replace the token allocation
///
/// # Errors
/// * `Unauthorized` - caller is not the owner
/// * `TransfersOpen` - deposits or withdrawals are open
/// * `ValuationUnavailable` - a deposit-eligible token has no usable price
/// * any `AllocationTable::replace` error
pub fn process_configure(
    strategy: &mut Strategy,
    caller: &Address,
    entries: &[AllocationEntry],
) -> Result<(), AllocatorError> {
    require_owner(strategy, caller)?;
    require_configurable(strategy)?;

    for entry in entries.iter().filter(|e| e.deposit_eligible) {
        strategy.valuation.value(&entry.key)?;
    }

    let before = strategy.allocation.clone();
    strategy.allocation.replace(entries)?;

    if strategy.allocation != before {
        let seqno = strategy.increment_seqno();
        log::info!(
            "Strategy {}: allocation replaced ({} tokens, seqno {})",
            strategy.id,
            strategy.allocation.len(),
            seqno
        );
    }
    Ok(())
}

/// Swap the custody backend
pub fn process_set_interactor(
    strategy: &mut Strategy,
    caller: &Address,
    custody: Box<dyn Interactor>,
) -> Result<(), AllocatorError> {
    require_owner(strategy, caller)?;
    require_configurable(strategy)?;
    strategy.custody = custody;
    log::info!("Strategy {}: interactor replaced", strategy.id);
    Ok(())
}

/// Swap the valuation adapter
///
/// Every deposit-eligible token must be priced by the new adapter.
pub fn process_set_valuation(
    strategy: &mut Strategy,
    caller: &Address,
    valuation: Arc<dyn ValuationAdapter>,
) -> Result<(), AllocatorError> {
    require_owner(strategy, caller)?;
    require_configurable(strategy)?;
    for token in strategy.allocation.deposit_keys() {
        valuation.value(&token)?;
    }
    strategy.valuation = valuation;
    log::info!("Strategy {}: valuation adapter replaced", strategy.id);
    Ok(())
}
