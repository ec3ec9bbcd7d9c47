//! Allocation tables shared by both tiers
//!
//! A table is a set of (key, percentage) entries. Key invariants:
//! - Deposit-eligible percentages sum to exactly 100%, or the table is empty
//! - Keys are unique
//! - Entries are stored in canonical (ascending key) order, so the same key
//!   set always materializes identically regardless of input order

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::error::AllocatorError;
use crate::math::ONE;
use crate::types::{Address, FixedPoint};

/// Maximum number of entries per allocation table
pub const MAX_ALLOCATION_ENTRIES: usize = 32;

/// One allocation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub key: Address,
    pub deposit_eligible: bool,
    pub withdraw_eligible: bool,
    pub percentage: FixedPoint,
}

impl AllocationEntry {
    /// Deposit- and withdraw-eligible entry
    pub fn new(key: Address, percentage: FixedPoint) -> Self {
        Self {
            key,
            deposit_eligible: true,
            withdraw_eligible: true,
            percentage,
        }
    }

    /// Residual/reward entry: returned on withdrawal, never deposited
    pub fn withdraw_only(key: Address) -> Self {
        Self {
            key,
            deposit_eligible: false,
            withdraw_eligible: true,
            percentage: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationTable {
    entries: ArrayVec<AllocationEntry, MAX_ALLOCATION_ENTRIES>,
}

impl AllocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace every entry
    ///
    /// Validation runs on a scratch copy; the stored table is untouched on
    /// error. Passing an empty slice clears the table.
    pub fn replace(&mut self, entries: &[AllocationEntry]) -> Result<(), AllocatorError> {
        if entries.len() > MAX_ALLOCATION_ENTRIES {
            return Err(AllocatorError::TooManyEntries {
                max: MAX_ALLOCATION_ENTRIES,
            });
        }
        if entries.iter().any(|e| e.percentage > ONE) {
            return Err(AllocatorError::PercentageOutOfRange);
        }

        let mut sorted: ArrayVec<AllocationEntry, MAX_ALLOCATION_ENTRIES> =
            entries.iter().copied().collect();
        sorted.sort_unstable_by_key(|e| e.key);

        if let Some(pair) = sorted.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(AllocatorError::DuplicateKey(pair[0].key));
        }

        let total_ok = ledger_model::allocation_total_ok(
            sorted.iter().map(|e| (e.deposit_eligible, e.percentage)),
        );
        if !total_ok {
            return Err(AllocatorError::InvalidAllocationTotal);
        }

        self.entries = sorted;
        Ok(())
    }

    /// Stored percentage, zero if the key is absent
    pub fn percentage_of(&self, key: &Address) -> FixedPoint {
        self.entry(key).map(|e| e.percentage).unwrap_or(0)
    }

    pub fn entry(&self, key: &Address) -> Option<&AllocationEntry> {
        self.entries
            .binary_search_by_key(key, |e| e.key)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, key: &Address) -> bool {
        self.entry(key).is_some()
    }

    /// Keys in canonical order
    pub fn keys(&self) -> impl Iterator<Item = Address> + Clone + '_ {
        self.entries.iter().map(|e| e.key)
    }

    /// Keys of deposit-eligible entries, canonical order
    pub fn deposit_keys(&self) -> impl Iterator<Item = Address> + Clone + '_ {
        self.entries.iter().filter(|e| e.deposit_eligible).map(|e| e.key)
    }

    /// Keys of withdraw-eligible entries, canonical order
    pub fn withdraw_keys(&self) -> impl Iterator<Item = Address> + Clone + '_ {
        self.entries.iter().filter(|e| e.withdraw_eligible).map(|e| e.key)
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    /// Position of `key` in canonical order
    pub fn index_of(&self, key: &Address) -> Option<usize> {
        self.entries.binary_search_by_key(key, |e| e.key).ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
