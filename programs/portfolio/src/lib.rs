//! Allocator Portfolio
//!
//! Upper ledger tier plus the engine that owns both tiers.
//!
//! ## Instructions
//!
//! - **configure_strategies**: replace the strategy allocation, then sync
//! - **sync**: rebuild the utilized-token cache from referenced strategies
//! - **deposit**: take tokens matching the combined two-level split, mint shares net of fees
//! - **strategy_deposit**: push held tokens into strategies
//! - **withdraw**: burn shares and pay out (two-phase or full mode)
//! - **strategy_withdraw**: pull tokens out of strategies
//! - **fee_rate_*_update / fee_recipient_update / manager_update / withdraw_full_mode_update**
//! - **toggle_deposit / toggle_withdraw**
//!
//! Staleness is detected lazily: a strategy changing its allocation does not
//! notify anyone. Portfolios compare fingerprints on their next deposit or
//! withdrawal and reject it with `SyncRequired`.

pub mod state;
pub mod instructions;
pub mod engine;

pub use state::*;
pub use instructions::*;
pub use engine::*;

#[cfg(test)]
pub(crate) mod fixtures;
