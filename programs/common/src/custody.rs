//! Custody boundary
//!
//! Ledgers never inspect how tokens are held; they move them through an
//! [`Interactor`]. [`Vault`] is the in-memory reference implementation.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::AllocatorError;
use crate::math::{checked_add, checked_sub};
use crate::types::{Address, Amount, TokenId};

/// Token custody capability consumed by both ledgers
pub trait Interactor: fmt::Debug + Send + Sync {
    /// Take `amount` of `token` into custody from `from`
    fn receive(&mut self, token: TokenId, amount: Amount, from: Address) -> Result<(), AllocatorError>;

    /// Release `amount` of `token` from custody to `to`
    fn send(&mut self, token: TokenId, amount: Amount, to: Address) -> Result<(), AllocatorError>;

    /// Currently custodied balance of `token`
    fn balance_of(&self, token: &TokenId) -> Amount;

    /// Clone into a new box; operations run against cloned drafts
    fn box_clone(&self) -> Box<dyn Interactor>;
}

impl Clone for Box<dyn Interactor> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// One recorded custody movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub token: TokenId,
    pub amount: Amount,
    pub counterparty: Address,
    pub direction: Direction,
}

/// In-memory custody holding balances per token
#[derive(Debug, Clone, Default)]
pub struct Vault {
    balances: BTreeMap<TokenId, Amount>,
    journal: Vec<Transfer>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit balance without a counterparty (rewards, airdrops)
    pub fn accrue(&mut self, token: TokenId, amount: Amount) -> Result<(), AllocatorError> {
        let balance = self.balances.entry(token).or_insert(0);
        *balance = checked_add(*balance, amount)?;
        Ok(())
    }

    /// Recorded movements, oldest first
    pub fn journal(&self) -> &[Transfer] {
        &self.journal
    }

    /// Total sent out to `to` for `token`
    pub fn sent_to(&self, token: &TokenId, to: &Address) -> Amount {
        self.journal
            .iter()
            .filter(|t| t.direction == Direction::Out && &t.token == token && &t.counterparty == to)
            .map(|t| t.amount)
            .sum()
    }
}

impl Interactor for Vault {
    fn receive(&mut self, token: TokenId, amount: Amount, from: Address) -> Result<(), AllocatorError> {
        if amount == 0 {
            return Ok(());
        }
        self.accrue(token, amount)?;
        self.journal.push(Transfer {
            token,
            amount,
            counterparty: from,
            direction: Direction::In,
        });
        Ok(())
    }

    fn send(&mut self, token: TokenId, amount: Amount, to: Address) -> Result<(), AllocatorError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balances.entry(token).or_insert(0);
        if *balance < amount {
            return Err(AllocatorError::InsufficientTokenBalance(token));
        }
        *balance = checked_sub(*balance, amount)?;
        self.journal.push(Transfer {
            token,
            amount,
            counterparty: to,
            direction: Direction::Out,
        });
        Ok(())
    }

    fn balance_of(&self, token: &TokenId) -> Amount {
        self.balances.get(token).copied().unwrap_or(0)
    }

    fn box_clone(&self) -> Box<dyn Interactor> {
        Box::new(self.clone())
    }
}
