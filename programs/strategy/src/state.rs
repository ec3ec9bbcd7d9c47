//! Strategy ledger state

use std::collections::BTreeMap;
use std::sync::Arc;

use allocator_common::{
    checked_add, checked_sub, Address, AllocationTable, AllocatorError, Interactor, StrategyId,
    TokenId, ValuationAdapter,
};

/// Lower-tier ledger: custodies a basket of tokens and issues shares
///
/// One share is minted per value unit deposited, so `shares_total` tracks
/// cumulative deposited value minus withdrawn value. Withdrawals pay out
/// a pro-rata slice of the *current* custodied balance of every
/// withdraw-eligible token.
#[derive(Debug, Clone)]
pub struct Strategy {
    /// Strategy identifier
    pub id: StrategyId,
    /// Deployer-authorized owner (configuration and toggles)
    pub owner: Address,
    pub(crate) allocation: AllocationTable,
    pub(crate) shares_total: u128,
    pub(crate) owner_shares: BTreeMap<Address, u128>,
    pub(crate) custody: Box<dyn Interactor>,
    pub(crate) valuation: Arc<dyn ValuationAdapter>,
    pub(crate) deposit_open: bool,
    pub(crate) withdraw_open: bool,
    /// Incremented whenever the token allocation changes
    pub(crate) seqno: u64,
}

impl Strategy {
    /// Empty allocation, zero shares, both directions closed
    pub fn new(
        id: StrategyId,
        owner: Address,
        custody: Box<dyn Interactor>,
        valuation: Arc<dyn ValuationAdapter>,
    ) -> Self {
        Self {
            id,
            owner,
            allocation: AllocationTable::new(),
            shares_total: 0,
            owner_shares: BTreeMap::new(),
            custody,
            valuation,
            deposit_open: false,
            withdraw_open: false,
            seqno: 0,
        }
    }

    pub fn allocation(&self) -> &AllocationTable {
        &self.allocation
    }

    /// Token keys in canonical order; deposit amounts follow this order
    pub fn tokens(&self) -> Vec<TokenId> {
        self.allocation.keys().collect()
    }

    pub fn deposit_tokens(&self) -> Vec<TokenId> {
        self.allocation.deposit_keys().collect()
    }

    pub fn withdraw_tokens(&self) -> Vec<TokenId> {
        self.allocation.withdraw_keys().collect()
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

    pub fn custody(&self) -> &dyn Interactor {
        self.custody.as_ref()
    }

    /// Mutable custody access for balance changes outside the ledger (rewards)
    pub fn custody_mut(&mut self) -> &mut dyn Interactor {
        self.custody.as_mut()
    }

    pub fn valuation(&self) -> &Arc<dyn ValuationAdapter> {
        &self.valuation
    }

    pub fn balance_of(&self, token: &TokenId) -> u128 {
        self.custody.balance_of(token)
    }

    pub fn is_deposit_open(&self) -> bool {
        self.deposit_open
    }

    pub fn is_withdraw_open(&self) -> bool {
        self.withdraw_open
    }

    pub fn seqno(&self) -> u64 {
        self.seqno
    }

    /// Configuration is only allowed with both directions closed
    pub fn is_configurable(&self) -> bool {
        !self.deposit_open && !self.withdraw_open
    }

    /// `shares_total == Σ owner_shares`
    pub fn shares_conserved(&self) -> bool {
        ledger_model::shares_conserved(self.shares_total, self.owner_shares.values().copied())
    }

    pub(crate) fn mint(&mut self, owner: Address, shares: u128) -> Result<(), AllocatorError> {
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

    pub(crate) fn increment_seqno(&mut self) -> u64 {
        self.seqno = self.seqno.wrapping_add(1);
        self.seqno
    }
}
