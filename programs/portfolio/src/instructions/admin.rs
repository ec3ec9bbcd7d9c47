//! Manager handover, withdraw mode and open/close toggles

use allocator_common::{Address, AllocatorError};

use crate::state::Portfolio;

/// Hand the portfolio to a new manager (current manager only)
///
/// The manager-fee recipient is left untouched.
pub fn process_manager_update(
    portfolio: &mut Portfolio,
    caller: &Address,
    new_manager: Address,
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;
    log::info!("Portfolio {}: manager {} -> {}", portfolio.id, portfolio.manager, new_manager);
    portfolio.manager = new_manager;
    Ok(())
}

/// Switch between two-phase and full withdrawals
pub fn process_withdraw_full_mode_update(
    portfolio: &mut Portfolio,
    caller: &Address,
    full_mode: bool,
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;
    portfolio.withdraw_full_mode = full_mode;
    log::info!("Portfolio {}: withdraw_full_mode = {}", portfolio.id, full_mode);
    Ok(())
}

/// Flip `deposit_open`; returns the new state
pub fn process_toggle_deposit(portfolio: &mut Portfolio, caller: &Address) -> Result<bool, AllocatorError> {
    portfolio.require_manager(caller)?;
    portfolio.deposit_open = !portfolio.deposit_open;
    log::info!("Portfolio {}: deposit_open = {}", portfolio.id, portfolio.deposit_open);
    Ok(portfolio.deposit_open)
}

/// Flip `withdraw_open`; returns the new state
pub fn process_toggle_withdraw(portfolio: &mut Portfolio, caller: &Address) -> Result<bool, AllocatorError> {
    portfolio.require_manager(caller)?;
    portfolio.withdraw_open = !portfolio.withdraw_open;
    log::info!("Portfolio {}: withdraw_open = {}", portfolio.id, portfolio.withdraw_open);
    Ok(portfolio.withdraw_open)
}
