//! Allocation fingerprints and lazy staleness detection
//!
//! A portfolio snapshots the fingerprint of every referenced strategy's
//! token allocation when it syncs, the way a quote cache snapshots a book's
//! sequence number. Nothing is pushed to the portfolio when a strategy
//! changes; staleness is discovered by recomputing and comparing.

use std::collections::BTreeMap;

use allocator_common::{AllocatorError, StrategyId};
use allocator_strategy::Strategy;
use sha2::{Digest, Sha256};

/// SHA-256 digest of one or more strategy allocations
pub type Fingerprint = [u8; 32];

/// Strategies visible to a portfolio, keyed by id
pub type Strategies = BTreeMap<StrategyId, Strategy>;

fn hash_allocation(hasher: &mut Sha256, strategy: &Strategy) {
    hasher.update(strategy.id.as_bytes());
    let entries = strategy.allocation().entries();
    hasher.update((entries.len() as u32).to_le_bytes());
    for entry in entries {
        hasher.update(entry.key.as_bytes());
        hasher.update([entry.deposit_eligible as u8, entry.withdraw_eligible as u8]);
        hasher.update(entry.percentage.to_le_bytes());
    }
}

/// Fingerprint of one strategy's token allocation: tokens, eligibility and percentages
pub fn strategy_fingerprint(strategy: &Strategy) -> Fingerprint {
    let mut hasher = Sha256::new();
    hash_allocation(&mut hasher, strategy);
    hasher.finalize().into()
}

/// Combined fingerprint over `keys`, in the order given
pub fn combined_fingerprint<'a, I>(keys: I, strategies: &Strategies) -> Result<Fingerprint, AllocatorError>
where
    I: IntoIterator<Item = &'a StrategyId>,
{
    let mut hasher = Sha256::new();
    for key in keys {
        let strategy = strategies.get(key).ok_or(AllocatorError::UnknownStrategy(*key))?;
        hash_allocation(&mut hasher, strategy);
    }
    Ok(hasher.finalize().into())
}

/// Per-portfolio record of the allocations seen at the last sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTracker {
    /// Combined fingerprint at the last successful sync
    synced: Option<Fingerprint>,
    /// Per-strategy fingerprints at the last successful sync
    snapshots: BTreeMap<StrategyId, Fingerprint>,
    /// Number of successful syncs
    generation: u64,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current allocations of `keys` as synced
    pub fn record(&mut self, keys: &[StrategyId], strategies: &Strategies) -> Result<Fingerprint, AllocatorError> {
        let combined = combined_fingerprint(keys, strategies)?;
        let mut snapshots = BTreeMap::new();
        for key in keys {
            let strategy = strategies.get(key).ok_or(AllocatorError::UnknownStrategy(*key))?;
            snapshots.insert(*key, strategy_fingerprint(strategy));
        }
        self.synced = Some(combined);
        self.snapshots = snapshots;
        self.generation = self.generation.wrapping_add(1);
        Ok(combined)
    }

    /// Stale when the combined fingerprint differs from the recorded one
    ///
    /// A tracker that never synced is stale unless there is nothing to track.
    pub fn is_stale(&self, keys: &[StrategyId], strategies: &Strategies) -> Result<bool, AllocatorError> {
        match self.synced {
            None => Ok(!keys.is_empty()),
            Some(synced) => Ok(combined_fingerprint(keys, strategies)? != synced),
        }
    }

    /// Number of `keys` whose allocations changed (or were never seen) since the last sync
    pub fn outdated_count(&self, keys: &[StrategyId], strategies: &Strategies) -> Result<usize, AllocatorError> {
        let mut count = 0;
        for key in keys {
            let strategy = strategies.get(key).ok_or(AllocatorError::UnknownStrategy(*key))?;
            if self.snapshots.get(key) != Some(&strategy_fingerprint(strategy)) {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn synced(&self) -> Option<Fingerprint> {
        self.synced
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
