//! Registry of recognized strategies and portfolios
//!
//! Consumed read-only by the ledgers. [`Directory`] is the in-memory
//! reference implementation the deployer fills in.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Address, PortfolioId, StrategyId};

/// Read-only lookups consumed at configuration time
pub trait Registry: fmt::Debug + Send + Sync {
    fn is_recognized_strategy(&self, id: &StrategyId) -> bool;

    fn is_recognized_portfolio(&self, id: &PortfolioId) -> bool;

    /// Recipient of governance fee shares
    fn fee_treasury(&self) -> Address;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Strategy,
    Portfolio,
}

/// Registration entry
#[derive(Debug, Clone, Copy)]
pub struct DirectoryEntry {
    pub kind: EntityKind,
    /// Deployer that registered the entity
    pub deployer: Address,
}

#[derive(Debug, Clone)]
pub struct Directory {
    /// Governance authority (can update the directory)
    pub governance: Address,
    pub fee_treasury: Address,
    entries: BTreeMap<Address, DirectoryEntry>,
}

impl Directory {
    pub fn new(governance: Address, fee_treasury: Address) -> Self {
        Self {
            governance,
            fee_treasury,
            entries: BTreeMap::new(),
        }
    }

    /// Register an entity; re-registering replaces its kind and deployer
    pub fn register(&mut self, id: Address, kind: EntityKind, deployer: Address) {
        self.entries.insert(
            id,
            DirectoryEntry { kind, deployer },
        );
    }

    pub fn register_strategy(&mut self, id: StrategyId, deployer: Address) {
        self.register(id, EntityKind::Strategy, deployer);
    }

    pub fn register_portfolio(&mut self, id: PortfolioId, deployer: Address) {
        self.register(id, EntityKind::Portfolio, deployer);
    }

    pub fn find(&self, id: &Address) -> Option<&DirectoryEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registry for Directory {
    fn is_recognized_strategy(&self, id: &StrategyId) -> bool {
        self.find(id).map(|e| e.kind == EntityKind::Strategy).unwrap_or(false)
    }

    fn is_recognized_portfolio(&self, id: &PortfolioId) -> bool {
        self.find(id).map(|e| e.kind == EntityKind::Portfolio).unwrap_or(false)
    }

    fn fee_treasury(&self) -> Address {
        self.fee_treasury
    }
}
