//! Open or close deposits and withdrawals

use allocator_common::{Address, AllocatorError};

use crate::state::Strategy;

use super::configure::require_owner;

/// Flip `deposit_open`; returns the new state
pub fn process_toggle_deposit(strategy: &mut Strategy, caller: &Address) -> Result<bool, AllocatorError> {
    require_owner(strategy, caller)?;
    strategy.deposit_open = !strategy.deposit_open;
    log::info!("Strategy {}: deposit_open = {}", strategy.id, strategy.deposit_open);
    Ok(strategy.deposit_open)
}

/// Flip `withdraw_open`; returns the new state
pub fn process_toggle_withdraw(strategy: &mut Strategy, caller: &Address) -> Result<bool, AllocatorError> {
    require_owner(strategy, caller)?;
    strategy.withdraw_open = !strategy.withdraw_open;
    log::info!("Strategy {}: withdraw_open = {}", strategy.id, strategy.withdraw_open);
    Ok(strategy.withdraw_open)
}
