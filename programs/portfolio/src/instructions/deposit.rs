//! End-user deposit into a portfolio

use std::collections::BTreeMap;

use allocator_common::{
    apply_rate, checked_add, mul_div, Address, Amount, AllocatorError, FixedPoint, Registry, TokenId,
    ONE,
};
use ledger_model::FeeSplit;

use crate::state::{Portfolio, Strategies};

/// Expected share of every token in a portfolio deposit
///
/// Each strategy's allocation percentage multiplied by that strategy's own
/// token percentage, summed per token. Only deposit-eligible entries on
/// both levels contribute.
pub fn combined_allocation(
    portfolio: &Portfolio,
    strategies: &Strategies,
) -> Result<BTreeMap<TokenId, FixedPoint>, AllocatorError> {
    let mut combined: BTreeMap<TokenId, FixedPoint> = BTreeMap::new();
    for entry in portfolio.allocation.entries().iter().filter(|e| e.deposit_eligible) {
        let strategy = strategies
            .get(&entry.key)
            .ok_or(AllocatorError::UnknownStrategy(entry.key))?;
        for token in strategy.allocation().entries().iter().filter(|t| t.deposit_eligible) {
            let weight = mul_div(entry.percentage, token.percentage, ONE)?;
            let slot = combined.entry(token.key).or_insert(0);
            *slot = checked_add(*slot, weight)?;
        }
    }
    Ok(combined)
}

/// Process portfolio deposit instruction
///
/// # Arguments
/// * `portfolio` - Portfolio account (mutable)
/// * `strategies` - Strategy ledgers, read for staleness and allocations
/// * `registry` - Supplies the governance fee treasury
/// * `caller` - Depositor; tokens are taken from and shares minted to this account
/// * `amounts` - One amount per utilized token, in `tokens()` order
/// * `tolerance` - Absolute slack (value units) per token proportion check
///
/// # Returns
/// * Shares minted to the depositor, net of dilutive fees
///
/// Tokens stay in portfolio custody; nothing is pushed into strategies.
pub fn process_deposit(
    portfolio: &mut Portfolio,
    strategies: &Strategies,
    registry: &dyn Registry,
    caller: &Address,
    amounts: &[Amount],
    tolerance: u128,
) -> Result<u128, AllocatorError> {
    log::debug!("PortfolioDeposit: Starting ({})", portfolio.id);

    if !portfolio.deposit_open {
        return Err(AllocatorError::DepositClosed);
    }

    if portfolio.is_stale(strategies)? {
        log::warn!("PortfolioDeposit: {} is stale", portfolio.id);
        return Err(AllocatorError::SyncRequired);
    }

    if amounts.len() != portfolio.utilized_tokens.len() {
        return Err(AllocatorError::InvalidTokenSetLength {
            expected: portfolio.utilized_tokens.len(),
            actual: amounts.len(),
        });
    }

    let mut values = Vec::with_capacity(amounts.len());
    let mut total_value: u128 = 0;
    for (token, amount) in portfolio.utilized_tokens.iter().zip(amounts) {
        let value = portfolio.valuation.value_of(token, *amount)?;
        total_value = checked_add(total_value, value)?;
        values.push(value);
    }

    if total_value == 0 {
        return Err(AllocatorError::ZeroValue);
    }

    log::debug!("PortfolioDeposit: total value {}", total_value);

    // Two-level expectation flattened into one check per token
    let combined = combined_allocation(portfolio, strategies)?;
    for (token, value) in portfolio.utilized_tokens.iter().zip(&values) {
        let weight = combined.get(token).copied().unwrap_or(0);
        let expected = apply_rate(total_value, weight)?;
        if !ledger_model::within_tolerance(*value, expected, tolerance) {
            log::warn!(
                "PortfolioDeposit: token {} valued {} but expected {}",
                token,
                value,
                expected
            );
            return Err(AllocatorError::InvalidAllocation);
        }
    }

    let legs: Vec<(TokenId, Amount)> = portfolio
        .utilized_tokens
        .iter()
        .copied()
        .zip(amounts.iter().copied())
        .collect();
    for (token, amount) in legs {
        portfolio.custody.receive(token, amount, *caller)?;
    }

    let split: FeeSplit = ledger_model::fee_split(
        total_value,
        portfolio.fee_rate_manager,
        portfolio.fee_rate_governance,
    )
    .ok_or(AllocatorError::FeeExceeds100Percent)?;

    portfolio.mint(*caller, split.depositor)?;
    let fee_recipient = portfolio.fee_recipient_manager;
    portfolio.mint(fee_recipient, split.manager)?;
    portfolio.mint(registry.fee_treasury(), split.governance)?;

    log::debug!(
        "PortfolioDeposit: minted {} to depositor, {} manager fee, {} governance fee",
        split.depositor,
        split.manager,
        split.governance
    );

    Ok(split.depositor)
}
