//! Portfolio ledger state

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use allocator_common::{
    checked_add, checked_sub, Address, AllocationTable, AllocatorError, FixedPoint, Interactor,
    PortfolioId, StrategyId, TokenId, ValuationAdapter, ONE,
};

use crate::state::sync_tracker::{Strategies, SyncTracker};

/// Upper-tier ledger: allocates across strategies and issues shares to end users
///
/// Tokens deposited here stay in the portfolio's own custody until the
/// manager pushes them into strategies with `strategy_deposit`. Strategy
/// shares bought that way are recorded on the strategy side, under the
/// portfolio's id.
#[derive(Debug, Clone)]
pub struct Portfolio {
    /// Portfolio identifier; also the account strategies record shares under
    pub id: PortfolioId,
    pub(crate) manager: Address,
    pub(crate) allocation: AllocationTable,
    pub(crate) shares_total: u128,
    pub(crate) owner_shares: BTreeMap<Address, u128>,

    /// Union of referenced strategies' deposit-eligible tokens, canonical order
    pub(crate) utilized_tokens: Vec<TokenId>,
    /// Tokens paid out on withdrawal: utilized tokens plus withdraw-eligible tokens
    pub(crate) payout_tokens: Vec<TokenId>,
    pub(crate) sync: SyncTracker,

    pub(crate) fee_rate_manager: FixedPoint,
    pub(crate) fee_rate_governance: FixedPoint,
    pub(crate) fee_recipient_manager: Address,

    pub(crate) withdraw_full_mode: bool,
    pub(crate) deposit_open: bool,
    pub(crate) withdraw_open: bool,

    pub(crate) custody: Box<dyn Interactor>,
    pub(crate) valuation: Arc<dyn ValuationAdapter>,
}

impl Portfolio {
    /// Empty allocation, no fees, both directions closed
    ///
    /// The manager is also the initial manager-fee recipient.
    pub fn new(
        id: PortfolioId,
        manager: Address,
        custody: Box<dyn Interactor>,
        valuation: Arc<dyn ValuationAdapter>,
    ) -> Self {
        Self {
            id,
            manager,
            allocation: AllocationTable::new(),
            shares_total: 0,
            owner_shares: BTreeMap::new(),
            utilized_tokens: Vec::new(),
            payout_tokens: Vec::new(),
            sync: SyncTracker::new(),
            fee_rate_manager: 0,
            fee_rate_governance: 0,
            fee_recipient_manager: manager,
            withdraw_full_mode: false,
            deposit_open: false,
            withdraw_open: false,
            custody,
            valuation,
        }
    }

    pub fn manager(&self) -> Address {
        self.manager
    }

    /// Strategy allocation
    pub fn allocation(&self) -> &AllocationTable {
        &self.allocation
    }

    /// Strategy keys in canonical order; `strategy_deposit` follows this order
    pub fn strategy_keys(&self) -> Vec<StrategyId> {
        self.allocation.keys().collect()
    }

    pub fn percentage_of(&self, strategy: &StrategyId) -> FixedPoint {
        self.allocation.percentage_of(strategy)
    }

    /// Utilized tokens as of the last sync; `deposit` amounts follow this order
    pub fn tokens(&self) -> &[TokenId] {
        &self.utilized_tokens
    }

    pub fn payout_tokens(&self) -> &[TokenId] {
        &self.payout_tokens
    }

    pub fn shares_total(&self) -> u128 {
        self.shares_total
    }

    pub fn shares_of(&self, owner: &Address) -> u128 {
        self.owner_shares.get(owner).copied().unwrap_or(0)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.owner_shares.iter()
    }

    pub fn fee_rate_manager(&self) -> FixedPoint {
        self.fee_rate_manager
    }

    pub fn fee_rate_governance(&self) -> FixedPoint {
        self.fee_rate_governance
    }

    pub fn fee_recipient_manager(&self) -> Address {
        self.fee_recipient_manager
    }

    pub fn is_withdraw_full_mode(&self) -> bool {
        self.withdraw_full_mode
    }

    pub fn is_deposit_open(&self) -> bool {
        self.deposit_open
    }

    pub fn is_withdraw_open(&self) -> bool {
        self.withdraw_open
    }

    pub fn sync_tracker(&self) -> &SyncTracker {
        &self.sync
    }

    pub fn custody(&self) -> &dyn Interactor {
        self.custody.as_ref()
    }

    pub fn valuation(&self) -> &Arc<dyn ValuationAdapter> {
        &self.valuation
    }

    /// Balance held directly at portfolio level
    pub fn balance_of(&self, token: &TokenId) -> u128 {
        self.custody.balance_of(token)
    }

    /// Allocation keys plus every strategy the portfolio still holds shares in
    pub fn held_strategies(&self, strategies: &Strategies) -> Vec<StrategyId> {
        let mut held: BTreeSet<StrategyId> = self.allocation.keys().collect();
        held.extend(
            strategies
                .iter()
                .filter(|(_, s)| s.shares_of(&self.id) > 0)
                .map(|(id, _)| *id),
        );
        held.into_iter().collect()
    }

    pub fn is_stale(&self, strategies: &Strategies) -> Result<bool, AllocatorError> {
        self.sync.is_stale(&self.strategy_keys(), strategies)
    }

    /// Strategy references whose allocations changed since the last sync
    pub fn outdated_references(&self, strategies: &Strategies) -> Result<usize, AllocatorError> {
        self.sync.outdated_count(&self.strategy_keys(), strategies)
    }

    /// `shares_total == Σ owner_shares`
    pub fn shares_conserved(&self) -> bool {
        ledger_model::shares_conserved(self.shares_total, self.owner_shares.values().copied())
    }

    /// Combined fee rates stay within 100%
    pub fn fees_valid(&self) -> bool {
        checked_add(self.fee_rate_manager, self.fee_rate_governance)
            .map(|sum| sum <= ONE)
            .unwrap_or(false)
    }

    pub(crate) fn require_manager(&self, caller: &Address) -> Result<(), AllocatorError> {
        if caller != &self.manager {
            log::warn!("Portfolio {}: caller {} is not the manager", self.id, caller);
            return Err(AllocatorError::Unauthorized(*caller));
        }
        Ok(())
    }

    pub(crate) fn mint(&mut self, owner: Address, shares: u128) -> Result<(), AllocatorError> {
        if shares == 0 {
            return Ok(());
        }
        let total = checked_add(self.shares_total, shares)?;
        let balance = checked_add(self.shares_of(&owner), shares)?;
        self.owner_shares.insert(owner, balance);
        self.shares_total = total;
        Ok(())
    }

    pub(crate) fn burn(&mut self, owner: Address, shares: u128) -> Result<(), AllocatorError> {
        let held = self.shares_of(&owner);
        if shares > held {
            return Err(AllocatorError::InsufficientShares);
        }
        let total = checked_sub(self.shares_total, shares)?;
        let balance = held - shares;
        if balance == 0 {
            self.owner_shares.remove(&owner);
        } else {
            self.owner_shares.insert(owner, balance);
        }
        self.shares_total = total;
        Ok(())
    }
}
