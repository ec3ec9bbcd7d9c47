//! Allocator Strategy
//!
//! Lower ledger tier. A strategy custodies a basket of tokens described by
//! an allocation table and issues shares priced in the common value unit.
//!
//! ## Instructions
//!
//! - **configure**: replace the token allocation (owner, transfers closed)
//! - **deposit**: take exactly-proportioned amounts, mint shares 1:1 with value
//! - **withdraw**: burn shares, pay out a pro-rata slice of custodied balances
//! - **toggle_deposit / toggle_withdraw**: open or close either direction
//!
//! Deposits and withdrawals are only accepted from callers the registry
//! recognizes as portfolios.

pub mod state;
pub mod instructions;

pub use state::*;
pub use instructions::*;

#[cfg(test)]
pub(crate) mod fixtures;
