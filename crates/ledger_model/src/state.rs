//! Pure state model of a share ledger

/// Small fixed bound on holders for exhaustive-style checks
pub const MAX_HOLDERS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Holding {
    pub holder: u8,
    pub shares: u128,
}

/// Reference share ledger: a total plus per-holder balances
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ShareBook {
    pub shares_total: u128,
    pub holdings: arrayvec::ArrayVec<Holding, MAX_HOLDERS>,
}

impl ShareBook {
    pub fn shares_of(&self, holder: u8) -> u128 {
        self.holdings
            .iter()
            .find(|h| h.holder == holder)
            .map(|h| h.shares)
            .unwrap_or(0)
    }
}

/// Fee split of a deposited value into depositor, manager and governance shares
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSplit {
    pub depositor: u128,
    pub manager: u128,
    pub governance: u128,
}

impl FeeSplit {
    pub fn total(&self) -> Option<u128> {
        self.depositor.checked_add(self.manager)?.checked_add(self.governance)
    }
}
