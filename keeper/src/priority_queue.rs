//! Priority queue of stale portfolios (most out-of-date first)

use allocator_common::PortfolioId;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Stale portfolio snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePortfolio {
    /// Portfolio id
    pub portfolio: PortfolioId,
    /// Strategy references whose allocations changed since the last sync
    pub outdated: usize,
    /// Round in which the portfolio was first seen stale
    pub first_seen: u64,
}

/// Sync priority: more outdated references first, then longest waiting
type Priority = (usize, Reverse<u64>);

pub struct SyncQueue {
    queue: PriorityQueue<PortfolioId, Priority>,
    map: HashMap<PortfolioId, StalePortfolio>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update a stale portfolio
    ///
    /// A portfolio already queued keeps its original `first_seen` round.
    pub fn push(&mut self, mut entry: StalePortfolio) {
        if let Some(existing) = self.map.get(&entry.portfolio) {
            entry.first_seen = existing.first_seen.min(entry.first_seen);
        }
        let priority = (entry.outdated, Reverse(entry.first_seen));
        self.queue.push(entry.portfolio, priority);
        self.map.insert(entry.portfolio, entry);
    }

    pub fn pop(&mut self) -> Option<StalePortfolio> {
        let (portfolio, _priority) = self.queue.pop()?;
        self.map.remove(&portfolio)
    }

    pub fn peek(&self) -> Option<&StalePortfolio> {
        let (portfolio, _priority) = self.queue.peek()?;
        self.map.get(portfolio)
    }

    pub fn remove(&mut self, portfolio: &PortfolioId) -> Option<StalePortfolio> {
        self.queue.remove(portfolio);
        self.map.remove(portfolio)
    }

    pub fn contains(&self, portfolio: &PortfolioId) -> bool {
        self.map.contains_key(portfolio)
    }

    /// Replace the queue contents with the engine's current stale set
    ///
    /// Portfolios no longer stale are dropped; the rest keep their wait time.
    pub fn refresh(&mut self, stale: &[(PortfolioId, usize)], round: u64) {
        let keep: Vec<PortfolioId> = stale.iter().map(|(id, _)| *id).collect();
        let gone: Vec<PortfolioId> = self
            .map
            .keys()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();
        for id in gone {
            self.remove(&id);
        }
        for (portfolio, outdated) in stale {
            self.push(StalePortfolio {
                portfolio: *portfolio,
                outdated: *outdated,
                first_seen: round,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for SyncQueue {
    fn default() -> Self {
        Self::new()
    }
}
