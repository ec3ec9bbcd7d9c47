//! Fee rates and the manager-fee recipient

use allocator_common::{checked_add, Address, AllocatorError, FixedPoint, ONE};

use crate::state::Portfolio;

fn require_fee_budget(rate: FixedPoint, other: FixedPoint) -> Result<(), AllocatorError> {
    match checked_add(rate, other) {
        Ok(sum) if sum <= ONE => Ok(()),
        _ => Err(AllocatorError::FeeExceeds100Percent),
    }
}

/// Set the manager fee rate; combined with the governance rate it must stay within 100%
pub fn process_fee_rate_manager_update(
    portfolio: &mut Portfolio,
    caller: &Address,
    rate: FixedPoint,
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;
    require_fee_budget(rate, portfolio.fee_rate_governance)?;
    portfolio.fee_rate_manager = rate;
    log::info!("Portfolio {}: manager fee rate = {}", portfolio.id, rate);
    Ok(())
}

/// Set the governance fee rate; combined with the manager rate it must stay within 100%
pub fn process_fee_rate_governance_update(
    portfolio: &mut Portfolio,
    caller: &Address,
    rate: FixedPoint,
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;
    require_fee_budget(rate, portfolio.fee_rate_manager)?;
    portfolio.fee_rate_governance = rate;
    log::info!("Portfolio {}: governance fee rate = {}", portfolio.id, rate);
    Ok(())
}

pub fn process_fee_recipient_update(
    portfolio: &mut Portfolio,
    caller: &Address,
    recipient: Address,
) -> Result<(), AllocatorError> {
    portfolio.require_manager(caller)?;
    portfolio.fee_recipient_manager = recipient;
    log::info!("Portfolio {}: manager fee recipient = {}", portfolio.id, recipient);
    Ok(())
}
