//! Deposit tokens into a strategy and mint shares

use allocator_common::{
    apply_rate, checked_add, Address, Amount, AllocatorError, Registry,
};

use crate::state::Strategy;

/// Process deposit instruction
///
/// # Arguments
/// * `strategy` - Strategy account (mutable)
/// * `registry` - Directory used to recognize the calling portfolio
/// * `caller` - Depositing portfolio; receives the minted shares
/// * `amounts` - One amount per allocation key, in canonical key order
/// * `tolerance` - Absolute slack (value units) per token proportion check
///
/// # Returns
/// * Shares minted, equal to the total deposited value
///
/// Amounts are never rounded or adjusted: the caller pre-computes amounts
/// whose values match the allocation and any deviation beyond `tolerance`
/// is rejected.
pub fn process_deposit(
    strategy: &mut Strategy,
    registry: &dyn Registry,
    caller: &Address,
    amounts: &[Amount],
    tolerance: u128,
) -> Result<u128, AllocatorError> {
    log::debug!("StrategyDeposit: Starting ({})", strategy.id);

    if !registry.is_recognized_portfolio(caller) {
        log::warn!("StrategyDeposit: caller {} is not a recognized portfolio", caller);
        return Err(AllocatorError::Unauthorized(*caller));
    }

    if !strategy.deposit_open {
        return Err(AllocatorError::DepositClosed);
    }

    let entries = strategy.allocation.entries();
    if amounts.len() != entries.len() {
        return Err(AllocatorError::InvalidLength {
            expected: entries.len(),
            actual: amounts.len(),
        });
    }

    // Value every deposit-eligible leg; closed legs must be empty
    let mut values = Vec::with_capacity(entries.len());
    let mut total_value: u128 = 0;
    for (entry, amount) in entries.iter().zip(amounts) {
        if !entry.deposit_eligible {
            if *amount != 0 {
                return Err(AllocatorError::DepositClosedToken(entry.key));
            }
            values.push(0);
            continue;
        }
        let value = strategy.valuation.value_of(&entry.key, *amount)?;
        total_value = checked_add(total_value, value)?;
        values.push(value);
    }

    if total_value == 0 {
        return Err(AllocatorError::ZeroValue);
    }

    log::debug!("StrategyDeposit: total value {}", total_value);

    // Every deposit-eligible leg must carry its exact share of the total
    for (entry, value) in entries.iter().zip(&values) {
        if !entry.deposit_eligible {
            continue;
        }
        let expected = apply_rate(total_value, entry.percentage)?;
        if !ledger_model::within_tolerance(*value, expected, tolerance) {
            log::warn!(
                "StrategyDeposit: token {} valued {} but expected {}",
                entry.key,
                value,
                expected
            );
            return Err(AllocatorError::AllocationMismatch);
        }
    }

    let legs: Vec<_> = entries.iter().map(|e| e.key).zip(amounts.iter().copied()).collect();
    for (token, amount) in legs {
        strategy.custody.receive(token, amount, *caller)?;
    }

    // 1 share == 1 value unit at mint time
    let minted = total_value;
    strategy.mint(*caller, minted)?;

    log::debug!(
        "StrategyDeposit: minted {} shares to {} (total {})",
        minted,
        caller,
        strategy.shares_total
    );

    Ok(minted)
}
