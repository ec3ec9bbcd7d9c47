//! Portfolio instruction handlers
//!
//! Like the strategy handlers, these may leave partial effects behind on
//! error; the engine runs them against drafts.

pub mod admin;
pub mod configure;
pub mod deposit;
pub mod fees;
pub mod strategy_deposit;
pub mod strategy_withdraw;
pub mod sync;
pub mod withdraw;

pub use admin::*;
pub use configure::*;
pub use deposit::*;
pub use fees::*;
pub use strategy_deposit::*;
pub use strategy_withdraw::*;
pub use sync::*;
pub use withdraw::*;
